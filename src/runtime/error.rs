use thiserror::Error;

/// Runtime failure taxonomy. Messages are stable and mirror the host
/// language's phrasing; the VM stops at the first error.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("name '{name}' is not defined")]
    NameNotDefined { name: String },
    #[error("global name '{name}' is not defined")]
    GlobalNotDefined { name: String },
    #[error("unsupported operand type(s) for {op}: '{left}' and '{right}'")]
    UnsupportedOperands {
        op: String,
        left: String,
        right: String,
    },
    #[error("bad operand type for unary {op}: '{type_name}'")]
    BadUnaryOperand { op: String, type_name: String },
    #[error("'{op}' not supported between instances of '{left}' and '{right}'")]
    UnsupportedComparison {
        op: String,
        left: String,
        right: String,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer division or modulo by zero")]
    ModuloByZero,
    #[error("list index out of range")]
    ListIndexOutOfRange,
    #[error("string index out of range")]
    StringIndexOutOfRange,
    #[error("KeyError: {key}")]
    KeyError { key: String },
    #[error("'{type_name}' object is not subscriptable")]
    NotSubscriptable { type_name: String },
    #[error("'{type_name}' object does not support item assignment")]
    NoItemAssignment { type_name: String },
    #[error("'{type_name}' object is not callable")]
    NotCallable { type_name: String },
    #[error("'{type_name}' object is not iterable")]
    NotIterable { type_name: String },
    #[error("argument of type '{type_name}' is not iterable")]
    ArgumentNotIterable { type_name: String },
    #[error("function takes {expected} arguments but {found} were given")]
    ArityMismatch { expected: usize, found: usize },
    #[error("cannot convert {type_name} to int")]
    IntConversion { type_name: String },
    #[error("len() takes exactly one argument ({found} given)")]
    LenArity { found: usize },
    #[error("object of type '{type_name}' has no len()")]
    NoLen { type_name: String },
    #[error("range() takes 1 to 3 arguments")]
    RangeArity,
    #[error("range() step argument must not be zero")]
    RangeZeroStep,
    #[error("type() takes exactly one argument")]
    TypeArity,
    #[error("str() takes exactly one argument")]
    StrArity,
    #[error("value stack underflow")]
    StackUnderflow,
    #[error("i/o error while printing: {0}")]
    Io(#[from] std::io::Error),
}
