use super::{FloatKind, Indirection, IntKind, InterfaceShape, Reflect, TypeShape};
use ahash::AHashMap;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

macro_rules! reflect_scalars {
    ( $( $ty:ty => $shape:expr ),* $(,)? ) => {
        $(
            impl Reflect for $ty {
                fn shape() -> TypeShape {
                    $shape
                }
            }
        )*
    };
}

reflect_scalars! {
    bool => TypeShape::Bool,
    char => TypeShape::Char,
    String => TypeShape::String,
    &'static str => TypeShape::String,
    i8 => TypeShape::Int(IntKind::I8),
    i16 => TypeShape::Int(IntKind::I16),
    i32 => TypeShape::Int(IntKind::I32),
    i64 => TypeShape::Int(IntKind::I64),
    isize => TypeShape::Int(IntKind::Isize),
    u8 => TypeShape::Int(IntKind::U8),
    u16 => TypeShape::Int(IntKind::U16),
    u32 => TypeShape::Int(IntKind::U32),
    u64 => TypeShape::Int(IntKind::U64),
    usize => TypeShape::Int(IntKind::Usize),
    f32 => TypeShape::Float(FloatKind::F32),
    f64 => TypeShape::Float(FloatKind::F64),
    serde_json::Value => TypeShape::Interface(InterfaceShape { name: "Value", open: true }),
}

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::pointer(Indirection::Optional, T::shape())
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn shape() -> TypeShape {
        TypeShape::pointer(Indirection::Boxed, T::shape())
    }
}

impl<T: Reflect> Reflect for Arc<T> {
    fn shape() -> TypeShape {
        TypeShape::pointer(Indirection::Shared, T::shape())
    }
}

impl<T: Reflect> Reflect for Rc<T> {
    fn shape() -> TypeShape {
        TypeShape::pointer(Indirection::Shared, T::shape())
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> TypeShape {
        TypeShape::sequence(T::shape(), None)
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn shape() -> TypeShape {
        TypeShape::sequence(T::shape(), Some(N))
    }
}

impl<K: Reflect, V: Reflect, S: 'static> Reflect for HashMap<K, V, S> {
    fn shape() -> TypeShape {
        TypeShape::map(K::shape(), V::shape())
    }
}

impl<K: Reflect, V: Reflect> Reflect for AHashMap<K, V> {
    fn shape() -> TypeShape {
        TypeShape::map(K::shape(), V::shape())
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn shape() -> TypeShape {
        TypeShape::map(K::shape(), V::shape())
    }
}

impl Reflect for serde_json::Map<String, serde_json::Value> {
    fn shape() -> TypeShape {
        TypeShape::map(String::shape(), serde_json::Value::shape())
    }
}
