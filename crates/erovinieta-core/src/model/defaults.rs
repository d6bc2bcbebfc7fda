// ── Default substitution ──
//
// The portal uses `null` and `""` interchangeably for "not set". Every read
// of an optional upstream field goes through these helpers so that both
// collapse to the same caller-supplied default.

use serde_json::Value;

/// Values that can be "present but empty".
pub trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Blank for &str {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<T> Blank for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for Value {
    fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

macro_rules! never_blank {
    ($($t:ty),*) => {
        $(impl Blank for $t {
            fn is_blank(&self) -> bool {
                false
            }
        })*
    };
}

never_blank!(bool, i64, u32, f64);

/// `value`, unless it is absent or blank.
pub fn non_blank<T: Blank>(value: Option<T>) -> Option<T> {
    value.filter(|v| !v.is_blank())
}

/// `value`, or `default` when it is absent or blank.
pub fn or_default<T: Blank>(value: Option<T>, default: T) -> T {
    non_blank(value).unwrap_or(default)
}
