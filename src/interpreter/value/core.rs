use std::cell::RefCell;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use im_rc::Vector;
use num_bigint::BigInt;
use num_traits::Zero;
use ordered_float::OrderedFloat;

use crate::{
    interpreter::value::{
        dict::{DictValue, SetValue},
        function::{BuiltinDef, Closure, PartialApplication},
        range::RangeValue,
        sequence::SequenceHandle,
    },
    util::num::{bigint_to_f64, format_decimal},
};

/// Represents a runtime value in the interpreter.
///
/// The first nine variants are the "value" tier: they have deterministic
/// hashes and structural equality and may be used as dictionary and set
/// keys. The remaining variants are first-class objects that compare by
/// identity.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    /// An arbitrary-precision integer.
    Integer(BigInt),
    /// A decimal; wrapped so it is totally ordered and hashable.
    Decimal(OrderedFloat<f64>),
    Str(Rc<str>),
    Boolean(bool),
    /// An ordered persistent sequence with structural sharing.
    List(Vector<Value>),
    Dict(DictValue),
    Set(SetValue),
    Range(Rc<RangeValue>),
    /// A lazy, memoised stream.
    Sequence(SequenceHandle),
    /// A user-defined closure.
    Function(Rc<Closure>),
    /// A native operation registered in the root scope.
    Builtin(&'static BuiltinDef),
    /// A function with some argument slots already filled.
    Partial(Rc<PartialApplication>),
    /// Functions chained by `>>`, applied left to right.
    Composition(Rc<Vec<Value>>),
    /// A single-owner mutable view of a collection, made by `asMutable`.
    Transient(Rc<RefCell<TransientValue>>),
    /// The value of `_` in argument position.
    Placeholder,
}

/// The collection kinds a transient view can wrap.
#[derive(Debug, Clone)]
pub enum TransientValue {
    List(Vector<Value>),
    Dict(DictValue),
    Set(SetValue),
}

impl TransientValue {
    /// Converts the view back to its persistent form.
    #[must_use]
    pub fn to_persistent(&self) -> Value {
        match self {
            Self::List(items) => Value::List(items.clone()),
            Self::Dict(dict) => Value::Dict(dict.clone()),
            Self::Set(set) => Value::Set(set.clone()),
        }
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Self::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(BigInt::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Decimal(OrderedFloat(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(Rc::from(v.as_str()))
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(v.into_iter().collect())
    }
}

impl Value {
    /// The name of the value's type, as reported by `type`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "Nil",
            Self::Integer(_) => "Integer",
            Self::Decimal(_) => "Decimal",
            Self::Str(_) => "String",
            Self::Boolean(_) => "Boolean",
            Self::List(_) => "List",
            Self::Dict(_) => "Dictionary",
            Self::Set(_) => "Set",
            Self::Range(_) => "Range",
            Self::Sequence(_) => "Sequence",
            Self::Function(_) | Self::Builtin(_) | Self::Partial(_) | Self::Composition(_) => {
                "Function"
            },
            Self::Transient(inner) => match &*inner.borrow() {
                TransientValue::List(_) => "TransientList",
                TransientValue::Dict(_) => "TransientDictionary",
                TransientValue::Set(_) => "TransientSet",
            },
            Self::Placeholder => "Placeholder",
        }
    }

    /// Truthiness: `nil`, `false`, zero and empty collections are falsy,
    /// everything else is truthy. An unbounded range is never empty.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Nil => false,
            Self::Boolean(b) => *b,
            Self::Integer(n) => !n.is_zero(),
            Self::Decimal(d) => d.0 != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Dict(dict) => !dict.is_empty(),
            Self::Set(set) => !set.is_empty(),
            Self::Range(range) => !range.is_empty(),
            Self::Sequence(_)
            | Self::Function(_)
            | Self::Builtin(_)
            | Self::Partial(_)
            | Self::Composition(_)
            | Self::Transient(_)
            | Self::Placeholder => true,
        }
    }

    /// Whether the value belongs to the hashable "value" tier and may be a
    /// dictionary or set key.
    #[must_use]
    pub fn is_hashable(&self) -> bool {
        match self {
            Self::Nil
            | Self::Integer(_)
            | Self::Decimal(_)
            | Self::Str(_)
            | Self::Boolean(_)
            | Self::Set(_)
            | Self::Range(_) => true,
            Self::List(items) => items.iter().all(Self::is_hashable),
            Self::Dict(dict) => dict.iter().all(|(_, value)| value.is_hashable()),
            Self::Sequence(_)
            | Self::Function(_)
            | Self::Builtin(_)
            | Self::Partial(_)
            | Self::Composition(_)
            | Self::Transient(_)
            | Self::Placeholder => false,
        }
    }

    /// The canonical textual form used by result reporting.
    ///
    /// For literal-expressible values the output reads back as source:
    /// strings come out quoted and escaped.
    #[must_use]
    pub fn inspect(&self) -> String {
        match self {
            Self::Nil => "nil".to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Decimal(d) => format_decimal(d.0),
            Self::Str(s) => quote_string(s),
            Self::Boolean(b) => b.to_string(),
            Self::List(items) => {
                let rendered: Vec<String> = items.iter().map(Self::inspect).collect();
                format!("[{}]", rendered.join(", "))
            },
            Self::Dict(dict) => {
                let rendered: Vec<String> = dict.iter()
                                                .map(|(k, v)| {
                                                    format!("{}: {}", k.inspect(), v.inspect())
                                                })
                                                .collect();
                format!("#{{{}}}", rendered.join(", "))
            },
            Self::Set(set) => {
                let rendered: Vec<String> = set.iter().map(Self::inspect).collect();
                format!("{{{}}}", rendered.join(", "))
            },
            Self::Range(range) => {
                if range.has_inferred_step() {
                    match &range.end {
                        Some(end) => {
                            let dots = if range.inclusive { "..=" } else { ".." };
                            format!("{}{}{}", range.start, dots, end)
                        },
                        None => format!("{}..", range.start),
                    }
                } else {
                    match &range.end {
                        Some(end) => format!("range({}, {}, {})", range.start, end, range.step),
                        None => format!("{}..", range.start),
                    }
                }
            },
            Self::Sequence(_) => "<sequence>".to_string(),
            Self::Function(closure) => format!("<function/{}>", closure.arity()),
            Self::Builtin(def) => format!("<builtin {}>", def.name),
            Self::Partial(partial) => format!("<partial/{}>", partial.holes()),
            Self::Composition(_) => "<composed function>".to_string(),
            Self::Transient(inner) => inner.borrow().to_persistent().inspect(),
            Self::Placeholder => "_".to_string(),
        }
    }

    /// Orders two values when an ordering exists.
    ///
    /// Orderings are total within a type; across types only Integer and
    /// Decimal compare, by promoting the integer side.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Decimal(b)) => {
                OrderedFloat(bigint_to_f64(a)).partial_cmp(b)
            },
            (Self::Decimal(a), Self::Integer(b)) => {
                a.partial_cmp(&OrderedFloat(bigint_to_f64(b)))
            },
            (Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::List(a), Self::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y)? {
                        Ordering::Equal => {},
                        unequal => return Some(unequal),
                    }
                }
                Some(a.len().cmp(&b.len()))
            },
            _ => None,
        }
    }
}

/// Quotes and escapes a string for `inspect`.
fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// The user-facing rendering: like `inspect`, except bare strings print
/// unquoted. Used by `puts`, `str` and string interpolation.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            other => write!(f, "{}", other.inspect()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Range(a), Self::Range(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => std::ptr::eq(*a, *b),
            (Self::Partial(a), Self::Partial(b)) => Rc::ptr_eq(a, b),
            (Self::Composition(a), Self::Composition(b)) => Rc::ptr_eq(a, b),
            (Self::Transient(a), Self::Transient(b)) => Rc::ptr_eq(a, b),
            (Self::Placeholder, Self::Placeholder) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Nil | Self::Placeholder => {},
            Self::Integer(n) => n.hash(state),
            Self::Decimal(d) => d.hash(state),
            Self::Str(s) => s.hash(state),
            Self::Boolean(b) => b.hash(state),
            Self::List(items) => {
                for item in items {
                    item.hash(state);
                }
            },
            Self::Dict(dict) => dict.hash(state),
            Self::Set(set) => set.hash(state),
            Self::Range(range) => range.hash(state),
            // Identity hashes for the non-value tier; these are kept out of
            // keys by the `is_hashable` gate.
            Self::Sequence(handle) => Rc::as_ptr(handle).hash(state),
            Self::Function(closure) => Rc::as_ptr(closure).hash(state),
            Self::Builtin(def) => std::ptr::from_ref(*def).hash(state),
            Self::Partial(partial) => Rc::as_ptr(partial).hash(state),
            Self::Composition(chain) => Rc::as_ptr(chain).hash(state),
            Self::Transient(inner) => Rc::as_ptr(inner).hash(state),
        }
    }
}
