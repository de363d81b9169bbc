use crate::runtime::error::RuntimeError;
use crate::runtime::value::Value;

/// Built-in callables registered with every VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Len,
    Range,
    Type,
    Str,
}

impl Builtin {
    pub const ALL: [Builtin; 4] = [Builtin::Len, Builtin::Range, Builtin::Type, Builtin::Str];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::Range => "range",
            Builtin::Type => "type",
            Builtin::Str => "str",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "len" => Some(Builtin::Len),
            "range" => Some(Builtin::Range),
            "type" => Some(Builtin::Type),
            "str" => Some(Builtin::Str),
            _ => None,
        }
    }

    pub fn call(self, args: &[Value]) -> Result<Value, RuntimeError> {
        match self {
            Builtin::Len => builtin_len(args),
            Builtin::Range => builtin_range(args),
            Builtin::Type => builtin_type(args),
            Builtin::Str => builtin_str(args),
        }
    }
}

fn builtin_len(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::LenArity { found: args.len() });
    }
    match &args[0] {
        Value::Str(value) => Ok(Value::Int(value.chars().count() as i64)),
        Value::List(values) => Ok(Value::Int(values.borrow().len() as i64)),
        Value::Dict(dict) => Ok(Value::Int(dict.borrow().len() as i64)),
        other => Err(RuntimeError::NoLen {
            type_name: other.type_name().to_string(),
        }),
    }
}

/// `range` materializes its list up front, so iteration always sees a list.
fn builtin_range(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.is_empty() || args.len() > 3 {
        return Err(RuntimeError::RangeArity);
    }

    let (start, stop, step) = match args {
        [stop] => (0, stop.to_int()?, 1),
        [start, stop] => (start.to_int()?, stop.to_int()?, 1),
        [start, stop, step] => {
            let step = step.to_int()?;
            if step == 0 {
                return Err(RuntimeError::RangeZeroStep);
            }
            (start.to_int()?, stop.to_int()?, step)
        }
        _ => unreachable!("argument count checked above"),
    };

    let mut elements = Vec::new();
    let mut i = start;
    if step > 0 {
        while i < stop {
            elements.push(Value::Int(i));
            i += step;
        }
    } else {
        while i > stop {
            elements.push(Value::Int(i));
            i += step;
        }
    }

    Ok(Value::list(elements))
}

fn builtin_type(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::TypeArity);
    }
    Ok(Value::string(args[0].type_name()))
}

fn builtin_str(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::StrArity);
    }
    match &args[0] {
        // Strings convert to their bare contents, not the quoted render.
        Value::Str(value) => Ok(Value::Str(value.clone())),
        other => Ok(Value::string(other.render())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::value::Dict;

    fn as_ints(value: Value) -> Vec<i64> {
        let Value::List(values) = value else {
            panic!("expected list");
        };
        let values = values.borrow();
        values
            .iter()
            .map(|value| match value {
                Value::Int(i) => *i,
                other => panic!("expected int, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn len_of_string_list_and_dict() {
        assert_eq!(
            Builtin::Len.call(&[Value::string("hello")]).unwrap(),
            Value::Int(5)
        );
        assert_eq!(
            Builtin::Len
                .call(&[Value::list(vec![Value::Int(1), Value::Int(2)])])
                .unwrap(),
            Value::Int(2)
        );
        let mut dict = Dict::new();
        dict.insert("\"a\"".to_string(), Value::Int(1));
        assert_eq!(
            Builtin::Len.call(&[Value::dict(dict)]).unwrap(),
            Value::Int(1)
        );
    }

    #[test]
    fn len_rejects_other_types_and_bad_arity() {
        let err = Builtin::Len.call(&[Value::Int(1)]).unwrap_err();
        assert_eq!(err.to_string(), "object of type 'int' has no len()");
        let err = Builtin::Len.call(&[]).unwrap_err();
        assert_eq!(err.to_string(), "len() takes exactly one argument (0 given)");
    }

    #[test]
    fn range_forms() {
        assert_eq!(as_ints(Builtin::Range.call(&[Value::Int(3)]).unwrap()), vec![0, 1, 2]);
        assert_eq!(
            as_ints(
                Builtin::Range
                    .call(&[Value::Int(2), Value::Int(5)])
                    .unwrap()
            ),
            vec![2, 3, 4]
        );
        assert_eq!(
            as_ints(
                Builtin::Range
                    .call(&[Value::Int(10), Value::Int(0), Value::Int(-3)])
                    .unwrap()
            ),
            vec![10, 7, 4, 1]
        );
        assert_eq!(as_ints(Builtin::Range.call(&[Value::Int(0)]).unwrap()), Vec::<i64>::new());
    }

    #[test]
    fn range_accepts_bool_and_float_through_coercion() {
        assert_eq!(as_ints(Builtin::Range.call(&[Value::Bool(true)]).unwrap()), vec![0]);
        assert_eq!(as_ints(Builtin::Range.call(&[Value::Float(2.9)]).unwrap()), vec![0, 1]);
    }

    #[test]
    fn range_rejects_zero_step_and_bad_arity() {
        let err = Builtin::Range
            .call(&[Value::Int(0), Value::Int(5), Value::Int(0)])
            .unwrap_err();
        assert_eq!(err.to_string(), "range() step argument must not be zero");
        let err = Builtin::Range.call(&[]).unwrap_err();
        assert_eq!(err.to_string(), "range() takes 1 to 3 arguments");
    }

    #[test]
    fn type_names() {
        assert_eq!(
            Builtin::Type.call(&[Value::Int(1)]).unwrap(),
            Value::string("int")
        );
        assert_eq!(
            Builtin::Type.call(&[Value::string("x")]).unwrap(),
            Value::string("str")
        );
        assert_eq!(
            Builtin::Type.call(&[Value::None]).unwrap(),
            Value::string("NoneType")
        );
        assert_eq!(
            Builtin::Type.call(&[Value::Builtin(Builtin::Len)]).unwrap(),
            Value::string("builtin_function_or_method")
        );
    }

    #[test]
    fn str_renders_non_strings_and_passes_strings_through() {
        assert_eq!(
            Builtin::Str.call(&[Value::Int(42)]).unwrap(),
            Value::string("42")
        );
        assert_eq!(
            Builtin::Str.call(&[Value::string("hi")]).unwrap(),
            Value::string("hi")
        );
        assert_eq!(
            Builtin::Str.call(&[Value::Bool(true)]).unwrap(),
            Value::string("True")
        );
    }
}
