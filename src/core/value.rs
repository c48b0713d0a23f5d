use indexmap::IndexMap;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Interned identifier: a variable, function, class, or property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Symbol(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// A hybrid array key: PHP's single compound type keys on either space,
/// joint under numeric-string coercion (see `array_key_for`).
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum ArrayKey {
    Int(i64),
    Str(Rc<Vec<u8>>),
}

impl ArrayKey {
    pub fn from_value(value: &Value) -> ArrayKey {
        match value {
            Value::Int(i) => ArrayKey::Int(*i),
            Value::Str(s) => array_key_for(s),
            Value::Null => ArrayKey::Str(Rc::new(Vec::new())),
            Value::Bool(b) => ArrayKey::Int(if *b { 1 } else { 0 }),
            Value::Float(f) => ArrayKey::Int(*f as i64),
            _ => ArrayKey::Int(value.to_int()),
        }
    }
}

/// Coerce a byte string into an array key, applying PHP's canonical-integer
/// rule: a string key collapses to an integer key iff it matches
/// `^-?[1-9][0-9]*$` or is exactly `"0"`. Leading zeros, leading/trailing
/// whitespace, and a bare `-0` are never coerced.
pub fn array_key_for(s: &Rc<Vec<u8>>) -> ArrayKey {
    if is_canonical_integer_string(s) {
        if let Ok(text) = std::str::from_utf8(s) {
            if let Ok(i) = text.parse::<i64>() {
                return ArrayKey::Int(i);
            }
        }
    }
    ArrayKey::Str(Rc::clone(s))
}

fn is_canonical_integer_string(s: &[u8]) -> bool {
    if s == b"0" {
        return true;
    }
    let (negative, digits) = match s.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, s),
    };
    if digits.is_empty() || digits[0] == b'0' {
        return false;
    }
    if negative && digits == b"0" {
        return false;
    }
    digits.iter().all(u8::is_ascii_digit)
}

/// An ordered mapping from integer-or-string keys to values, with a
/// next-free-key counter that advances on explicit high keys and does not
/// rewind on delete.
#[derive(Debug, Clone, Default)]
pub struct PhpArray {
    pub entries: IndexMap<ArrayKey, Value>,
    pub next_free: i64,
}

impl PhpArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
            next_free: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert at an explicit key, coercing numeric strings, and advance the
    /// next-free counter when the key is an integer `>= next_free`.
    pub fn insert(&mut self, key: ArrayKey, value: Value) -> Option<Value> {
        if let ArrayKey::Int(i) = &key {
            if *i >= self.next_free {
                self.next_free = i.saturating_add(1);
            }
        }
        self.entries.insert(key, value)
    }

    pub fn insert_str_key(&mut self, key: &[u8], value: Value) -> Option<Value> {
        self.insert(array_key_for(&Rc::new(key.to_vec())), value)
    }

    /// Append with the auto-incremented key (`$a[] = ...`).
    pub fn push(&mut self, value: Value) {
        let key = ArrayKey::Int(self.next_free);
        self.next_free = self.next_free.saturating_add(1);
        self.entries.insert(key, value);
    }

    /// Delete preserves order of the rest and does not rewind `next_free`.
    pub fn remove(&mut self, key: &ArrayKey) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &ArrayKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn next_index(&self) -> i64 {
        self.next_free
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, ArrayKey, Value> {
        self.entries.iter()
    }
}

impl From<IndexMap<ArrayKey, Value>> for PhpArray {
    fn from(entries: IndexMap<ArrayKey, Value>) -> Self {
        let next_free = entries
            .keys()
            .filter_map(|k| match k {
                ArrayKey::Int(i) => Some(*i),
                ArrayKey::Str(_) => None,
            })
            .max()
            .map(|i| i + 1)
            .unwrap_or(0);
        Self { entries, next_free }
    }
}

impl PartialEq for PhpArray {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

#[derive(Debug, Clone)]
pub struct ObjectData {
    pub class: Symbol,
    pub properties: IndexMap<Symbol, Value>,
    pub internal: Option<Rc<dyn Any>>,
    pub dynamic_properties: HashSet<Symbol>,
}

impl ObjectData {
    pub fn new(class: Symbol) -> Self {
        Self {
            class,
            properties: IndexMap::new(),
            internal: None,
            dynamic_properties: HashSet::new(),
        }
    }
}

impl PartialEq for ObjectData {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.properties == other.properties
    }
}

/// A dynamically typed PHP value. Strings and arrays have value semantics
/// (mutation is observably "replace with a new logical value"); objects and
/// reference cells have reference semantics: clones of `Rc<RefCell<_>>`
/// observe each other's mutations.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<Vec<u8>>),
    Array(Rc<RefCell<PhpArray>>),
    Object(Rc<RefCell<ObjectData>>),
    Resource(Rc<dyn Any>),
    Reference(Rc<RefCell<Value>>),
}

/// Rust-level equality (used by tests and by collection types built on
/// `Value`) follows strict (`===`) semantics, not PHP's loose `==`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(other)
    }
}

impl Value {
    pub fn str(bytes: impl Into<Vec<u8>>) -> Value {
        Value::Str(Rc::new(bytes.into()))
    }

    pub fn array(arr: PhpArray) -> Value {
        Value::Array(Rc::new(RefCell::new(arr)))
    }

    pub fn object(obj: ObjectData) -> Value {
        Value::Object(Rc::new(RefCell::new(obj)))
    }

    pub fn reference(value: Value) -> Value {
        Value::Reference(Rc::new(RefCell::new(value)))
    }

    /// Follow a `Reference` to the value it points at; non-references
    /// deref to a cloned copy of themselves via the closure.
    pub fn deref_read<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        match self {
            Value::Reference(cell) => f(&cell.borrow()),
            other => f(other),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Resource(_) => "resource",
            Value::Reference(cell) => cell.borrow().type_name(),
        }
    }

    /// `zend_make_printable_zval`-equivalent string coercion.
    pub fn to_php_string_bytes(&self) -> Vec<u8> {
        match self {
            Value::Null => Vec::new(),
            Value::Bool(b) => {
                if *b {
                    b"1".to_vec()
                } else {
                    Vec::new()
                }
            }
            Value::Int(i) => i.to_string().into_bytes(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{:.0}", f).into_bytes()
                } else {
                    format!("{}", f).into_bytes()
                }
            }
            Value::Str(s) => s.as_ref().clone(),
            Value::Array(_) => b"Array".to_vec(),
            Value::Object(_) => b"Object".to_vec(),
            Value::Resource(_) => b"Resource".to_vec(),
            Value::Reference(cell) => cell.borrow().to_php_string_bytes(),
        }
    }

    /// `zend_is_true`-equivalent truthiness.
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !(s.is_empty() || s.as_slice() == b"0"),
            Value::Array(arr) => !arr.borrow().is_empty(),
            Value::Object(_) | Value::Resource(_) => true,
            Value::Reference(cell) => cell.borrow().to_bool(),
        }
    }

    /// `convert_to_long`-equivalent numeric coercion.
    pub fn to_int(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Bool(b) => *b as i64,
            Value::Int(i) => *i,
            Value::Float(f) => *f as i64,
            Value::Str(s) => parse_numeric_string(s).0,
            Value::Array(arr) => !arr.borrow().is_empty() as i64,
            Value::Object(_) => 1,
            Value::Resource(_) => 0,
            Value::Reference(cell) => cell.borrow().to_int(),
        }
    }

    /// `convert_to_double`-equivalent numeric coercion.
    pub fn to_float(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => *b as i64 as f64,
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Str(s) => {
                let (int_val, is_float) = parse_numeric_string(s);
                if is_float {
                    std::str::from_utf8(s)
                        .ok()
                        .and_then(|t| t.trim().parse::<f64>().ok())
                        .unwrap_or(int_val as f64)
                } else {
                    int_val as f64
                }
            }
            Value::Array(arr) => !arr.borrow().is_empty() as i64 as f64,
            Value::Object(_) => 1.0,
            Value::Resource(_) => 0.0,
            Value::Reference(cell) => cell.borrow().to_float(),
        }
    }

    /// PHP loose (`==`) equality: type-coercing.
    pub fn loose_eq(&self, other: &Value) -> bool {
        use Value::*;
        let a = self.resolve();
        let b = other.resolve();
        match (&a, &b) {
            (Null, Null) => true,
            (Bool(x), _) => *x == b.to_bool(),
            (_, Bool(y)) => a.to_bool() == *y,
            (Null, _) => !b.to_bool(),
            (_, Null) => !a.to_bool(),
            (Int(x), Int(y)) => x == y,
            (Float(x), Float(y)) => x == y,
            (Int(x), Float(y)) | (Float(y), Int(x)) => (*x as f64) == *y,
            (Str(x), Str(y)) => match (numeric_value(x), numeric_value(y)) {
                (Some(nx), Some(ny)) => nx == ny,
                _ => x == y,
            },
            (Str(s), Int(i)) | (Int(i), Str(s)) => {
                numeric_value(s).is_some_and(|n| n == *i as f64)
            }
            (Str(s), Float(f)) | (Float(f), Str(s)) => {
                numeric_value(s).is_some_and(|n| n == *f)
            }
            (Array(x), Array(y)) => {
                let x = x.borrow();
                let y = y.borrow();
                x.entries.len() == y.entries.len()
                    && x.entries
                        .iter()
                        .all(|(k, v)| y.entries.get(k).is_some_and(|yv| v.loose_eq(yv)))
            }
            (Object(x), Object(y)) => Rc::ptr_eq(x, y) || *x.borrow() == *y.borrow(),
            _ => false,
        }
    }

    /// PHP strict (`===`) equality: type-sensitive, no coercion.
    pub fn strict_eq(&self, other: &Value) -> bool {
        use Value::*;
        let a = self.resolve();
        let b = other.resolve();
        match (&a, &b) {
            (Null, Null) => true,
            (Bool(x), Bool(y)) => x == y,
            (Int(x), Int(y)) => x == y,
            (Float(x), Float(y)) => x == y,
            (Str(x), Str(y)) => x == y,
            (Array(x), Array(y)) => {
                let x = x.borrow();
                let y = y.borrow();
                x.entries.len() == y.entries.len()
                    && x.entries
                        .iter()
                        .zip(y.entries.iter())
                        .all(|((kx, vx), (ky, vy))| kx == ky && vx.strict_eq(vy))
            }
            (Object(x), Object(y)) => Rc::ptr_eq(x, y),
            (Resource(x), Resource(y)) => Rc::ptr_eq(x, y),
            _ => false,
        }
    }

    /// Follow `Reference` cells to the underlying value, cloning along the
    /// way (cheap: every variant but arrays/strings/objects is a scalar or
    /// an `Rc` clone).
    fn resolve(&self) -> Value {
        match self {
            Value::Reference(cell) => cell.borrow().resolve(),
            other => other.clone(),
        }
    }
}

/// Parse a numeric string per PHP's `is_numeric_string_ex`: returns
/// `(int_value, was_float)`. Non-numeric strings parse as `(0, false)`.
fn parse_numeric_string(s: &[u8]) -> (i64, bool) {
    let trimmed: Vec<u8> = s
        .iter()
        .skip_while(|&&b| b == b' ' || b == b'\t' || b == b'\n' || b == b'\r')
        .copied()
        .collect();
    if trimmed.is_empty() {
        return (0, false);
    }
    if let Ok(text) = std::str::from_utf8(&trimmed) {
        if let Ok(i) = text.trim_end().parse::<i64>() {
            return (i, false);
        }
        if let Ok(f) = text.trim_end().parse::<f64>() {
            return (f as i64, true);
        }
        // Leading-digit prefix parse for loosely-numeric strings like "3abc".
        let digits: String = text
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '-' || *c == '+')
            .collect();
        if let Ok(i) = digits.parse::<i64>() {
            return (i, false);
        }
    }
    (0, false)
}

fn numeric_value(s: &[u8]) -> Option<f64> {
    std::str::from_utf8(s).ok()?.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_integer_keys_coerce() {
        assert_eq!(array_key_for(&Rc::new(b"0".to_vec())), ArrayKey::Int(0));
        assert_eq!(array_key_for(&Rc::new(b"42".to_vec())), ArrayKey::Int(42));
        assert_eq!(array_key_for(&Rc::new(b"-7".to_vec())), ArrayKey::Int(-7));
    }

    #[test]
    fn non_canonical_strings_stay_string_keys() {
        assert_eq!(
            array_key_for(&Rc::new(b"01".to_vec())),
            ArrayKey::Str(Rc::new(b"01".to_vec()))
        );
        assert_eq!(
            array_key_for(&Rc::new(b"1.0".to_vec())),
            ArrayKey::Str(Rc::new(b"1.0".to_vec()))
        );
        assert_eq!(
            array_key_for(&Rc::new(b" 1".to_vec())),
            ArrayKey::Str(Rc::new(b" 1".to_vec()))
        );
        assert_eq!(
            array_key_for(&Rc::new(b"-0".to_vec())),
            ArrayKey::Str(Rc::new(b"-0".to_vec()))
        );
        assert_eq!(
            array_key_for(&Rc::new(Vec::new())),
            ArrayKey::Str(Rc::new(Vec::new()))
        );
    }

    #[test]
    fn push_advances_next_free_and_delete_does_not_rewind() {
        let mut arr = PhpArray::new();
        arr.push(Value::Int(10));
        arr.push(Value::Int(20));
        assert_eq!(arr.next_index(), 2);
        arr.remove(&ArrayKey::Int(0));
        assert_eq!(arr.next_index(), 2);
        arr.push(Value::Int(30));
        assert_eq!(arr.next_index(), 3);
        assert_eq!(arr.entries.get_index(0).unwrap().0, &ArrayKey::Int(1));
    }

    #[test]
    fn explicit_high_key_advances_counter() {
        let mut arr = PhpArray::new();
        arr.insert(ArrayKey::Int(5), Value::Int(1));
        assert_eq!(arr.next_index(), 6);
        arr.push(Value::Int(2));
        assert_eq!(arr.next_index(), 7);
    }

    #[test]
    fn truthiness_matches_php_rules() {
        assert!(!Value::Null.to_bool());
        assert!(!Value::Bool(false).to_bool());
        assert!(!Value::Int(0).to_bool());
        assert!(!Value::Float(0.0).to_bool());
        assert!(!Value::str("").to_bool());
        assert!(!Value::str("0").to_bool());
        assert!(Value::str("0.0").to_bool());
        assert!(!Value::array(PhpArray::new()).to_bool());
        assert!(Value::Int(1).to_bool());
    }

    #[test]
    fn loose_vs_strict_equality() {
        let zero = Value::Int(0);
        let empty_str = Value::str("");
        assert!(!zero.strict_eq(&empty_str));
        let one = Value::Int(1);
        let one_str = Value::str("1");
        assert!(one.loose_eq(&one_str));
        assert!(!one.strict_eq(&one_str));
    }

    #[test]
    fn float_to_string_drops_trailing_zero() {
        assert_eq!(Value::Float(1.0).to_php_string_bytes(), b"1");
        assert_eq!(Value::Float(1.5).to_php_string_bytes(), b"1.5");
    }
}
