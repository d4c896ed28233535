//! `define_port_error!`: port failure enums with `thiserror` messages and
//! one snake_case constructor per variant.
//!
//! Variants are either unit-like or carry a single field; the field's
//! constructor accepts anything convertible into its type.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[must_use]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident $field:ident $ty:ty) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($field: impl Into<$ty>) -> Self {
                Self::$variant { $field: $field.into() }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $field:ident : $ty:ty } )? => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $field: $ty } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( $field $ty )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum LookupError {
            Offline => "lookup backend offline",
            Refused { reason: String } => "lookup refused: {reason}",
            Throttled { retry_after_secs: u64 } => "lookup throttled for {retry_after_secs}s",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(LookupError::offline(), LookupError::Offline);
        assert_eq!(LookupError::offline().to_string(), "lookup backend offline");
    }

    #[test]
    fn field_constructors_convert_their_argument() {
        assert_eq!(
            LookupError::refused("quota").to_string(),
            "lookup refused: quota"
        );
        assert_eq!(
            LookupError::throttled(30_u64).to_string(),
            "lookup throttled for 30s"
        );
    }
}
