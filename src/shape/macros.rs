/// Implements [`Reflect`](crate::shape::Reflect) for a record type.
///
/// Fields are listed in declaration order. A field serialized under a
/// different key (e.g. through `#[serde(rename = "...")]`) names that key
/// with `as`:
///
/// ```rust
/// use kairo::reflect_record;
///
/// struct Person {
///     name: String,
///     age: u32,
///     nickname: Option<String>,
/// }
///
/// reflect_record!(Person {
///     name: String,
///     age: u32 as "years",
///     nickname: Option<String>,
/// });
/// ```
#[macro_export]
macro_rules! reflect_record {
    ( $record:ident { $( $field:ident : $ty:ty $( as $key:literal )? ),* $(,)? } ) => {
        impl $crate::shape::Reflect for $record {
            fn shape() -> $crate::shape::TypeShape {
                fn fields() -> ::std::vec::Vec<$crate::shape::FieldShape> {
                    ::std::vec![
                        $(
                            $crate::shape::FieldShape::new(
                                ::core::stringify!($field),
                                $crate::reflect_record!(@key $field $( , $key )?),
                                <$ty as $crate::shape::Reflect>::shape,
                            )
                        ),*
                    ]
                }
                $crate::shape::TypeShape::Record($crate::shape::RecordShape::new::<$record>(
                    ::core::stringify!($record),
                    fields,
                ))
            }
        }
    };
    (@key $field:ident) => {
        ::core::stringify!($field)
    };
    (@key $field:ident , $key:literal) => {
        $key
    };
}

/// Implements [`Reflect`](crate::shape::Reflect) as a closed interface: the
/// schema shows an `interface` node and literals can never populate it.
#[macro_export]
macro_rules! reflect_interface {
    ( $( $ty:ident ),* $(,)? ) => {
        $(
            impl $crate::shape::Reflect for $ty {
                fn shape() -> $crate::shape::TypeShape {
                    $crate::shape::TypeShape::Interface($crate::shape::InterfaceShape {
                        name: ::core::stringify!($ty),
                        open: false,
                    })
                }
            }
        )*
    };
}
