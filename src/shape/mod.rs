//! Type shapes: value-free descriptions of Rust types.
//!
//! A [`TypeShape`] is what the schema reflector and the literal converter
//! walk instead of runtime reflection. Shapes are obtained through the
//! [`Reflect`] trait, implemented here for the std types the toolkit
//! understands and for user records through [`reflect_record!`](crate::reflect_record).
//!
//! Record fields hand out their shapes lazily (as `fn() -> TypeShape`), so a
//! record that refers to itself can be described without building an
//! infinite value. Breaking the cycle while *walking* a shape is the
//! reflector's job.

mod impls;
mod macros;

use std::any::TypeId;
use std::fmt;

/// Lazily produces the shape of a record field.
pub type ShapeFn = fn() -> TypeShape;

/// Integer widths a destination field may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl IntKind {
    pub fn name(self) -> &'static str {
        match self {
            IntKind::I8 => "i8",
            IntKind::I16 => "i16",
            IntKind::I32 => "i32",
            IntKind::I64 => "i64",
            IntKind::Isize => "isize",
            IntKind::U8 => "u8",
            IntKind::U16 => "u16",
            IntKind::U32 => "u32",
            IntKind::U64 => "u64",
            IntKind::Usize => "usize",
        }
    }

    /// Inclusive range of values representable by this width.
    pub fn range(self) -> (i128, i128) {
        match self {
            IntKind::I8 => (i8::MIN as i128, i8::MAX as i128),
            IntKind::I16 => (i16::MIN as i128, i16::MAX as i128),
            IntKind::I32 => (i32::MIN as i128, i32::MAX as i128),
            IntKind::I64 => (i64::MIN as i128, i64::MAX as i128),
            IntKind::Isize => (isize::MIN as i128, isize::MAX as i128),
            IntKind::U8 => (0, u8::MAX as i128),
            IntKind::U16 => (0, u16::MAX as i128),
            IntKind::U32 => (0, u32::MAX as i128),
            IntKind::U64 => (0, u64::MAX as i128),
            IntKind::Usize => (0, usize::MAX as i128),
        }
    }

    pub fn contains(self, value: i128) -> bool {
        let (min, max) = self.range();
        value >= min && value <= max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    F32,
    F64,
}

impl FloatKind {
    pub fn name(self) -> &'static str {
        match self {
            FloatKind::F32 => "f32",
            FloatKind::F64 => "f64",
        }
    }
}

/// The flavor of a single level of indirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indirection {
    /// `Box<T>`
    Boxed,
    /// `Arc<T>` / `Rc<T>`
    Shared,
    /// `Option<T>`; the only indirection that admits `null`.
    Optional,
}

/// A value-free description of a type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    Bool,
    Char,
    String,
    Int(IntKind),
    Float(FloatKind),
    Indirect(Indirection, Box<TypeShape>),
    /// A list; `len` is set for fixed-size arrays.
    Sequence {
        element: Box<TypeShape>,
        len: Option<usize>,
    },
    Map {
        key: Box<TypeShape>,
        value: Box<TypeShape>,
    },
    Record(RecordShape),
    Interface(InterfaceShape),
    /// Anything the toolkit cannot describe (function pointers, handles, ...).
    Unsupported(&'static str),
}

impl TypeShape {
    pub fn pointer(indirection: Indirection, inner: TypeShape) -> Self {
        TypeShape::Indirect(indirection, Box::new(inner))
    }

    pub fn sequence(element: TypeShape, len: Option<usize>) -> Self {
        TypeShape::Sequence {
            element: Box::new(element),
            len,
        }
    }

    pub fn map(key: TypeShape, value: TypeShape) -> Self {
        TypeShape::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Shape of `T`.
    pub fn of<T: Reflect>() -> Self {
        T::shape()
    }

    /// Whether a record field of this shape may be omitted.
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeShape::Indirect(Indirection::Optional, _))
    }

    /// A Rust-flavored name for display and error messages.
    pub fn type_name(&self) -> String {
        match self {
            TypeShape::Bool => "bool".to_string(),
            TypeShape::Char => "char".to_string(),
            TypeShape::String => "String".to_string(),
            TypeShape::Int(kind) => kind.name().to_string(),
            TypeShape::Float(kind) => kind.name().to_string(),
            TypeShape::Indirect(indirection, inner) => match indirection {
                Indirection::Boxed => format!("Box<{}>", inner.type_name()),
                Indirection::Shared => format!("Arc<{}>", inner.type_name()),
                Indirection::Optional => format!("Option<{}>", inner.type_name()),
            },
            TypeShape::Sequence { element, len } => match len {
                Some(n) => format!("[{}; {}]", element.type_name(), n),
                None => format!("Vec<{}>", element.type_name()),
            },
            TypeShape::Map { key, value } => {
                format!("Map<{}, {}>", key.type_name(), value.type_name())
            }
            TypeShape::Record(record) => record.name().to_string(),
            TypeShape::Interface(interface) => interface.name.to_string(),
            TypeShape::Unsupported(name) => name.to_string(),
        }
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// A struct-like shape. Identity is the Rust `TypeId`, not the name.
#[derive(Clone)]
pub struct RecordShape {
    name: &'static str,
    type_id: TypeId,
    fields: fn() -> Vec<FieldShape>,
}

impl RecordShape {
    pub fn new<T: 'static>(name: &'static str, fields: fn() -> Vec<FieldShape>) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            fields,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> Vec<FieldShape> {
        (self.fields)()
    }
}

impl PartialEq for RecordShape {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for RecordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordShape")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// One declared field of a record.
#[derive(Clone)]
pub struct FieldShape {
    /// The declared Rust identifier; literals address the field by this name.
    pub name: &'static str,
    /// The serialized key (serde name) the materialized value is stored under.
    pub key: &'static str,
    shape: ShapeFn,
}

impl FieldShape {
    pub fn new(name: &'static str, key: &'static str, shape: ShapeFn) -> Self {
        Self { name, key, shape }
    }

    pub fn shape(&self) -> TypeShape {
        (self.shape)()
    }

    /// Every field is required unless its shape is `Option<_>`.
    pub fn required(&self) -> bool {
        !self.shape().is_optional()
    }
}

impl fmt::Debug for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldShape")
            .field("name", &self.name)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A dynamically typed destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceShape {
    pub name: &'static str,
    /// An open interface accepts any value (`serde_json::Value`); a closed
    /// one (a trait object) accepts none from a literal.
    pub open: bool,
}

/// Types that can describe their own shape.
pub trait Reflect: 'static {
    fn shape() -> TypeShape;
}
