//! Typed declaration of the per-node properties a computation uses.
//!
//! The schema is fixed once at computation start and drives column allocation in
//! [`NodeValue`](super::node_value::NodeValue). Keys are resolved to column
//! indices once, via [`PregelSchema::key`], so the per-node hot loop never
//! branches on a type tag.

use core::fmt;
use core::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::error::{PregelError, Result};

/// Value type of a node property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    /// `i64`
    Long,
    /// `f64`
    Double,
    /// `Vec<i64>`
    LongArray,
    /// `Vec<f64>`
    DoubleArray,
}

/// Whether a property is part of the computation's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    /// Exported with the result.
    #[default]
    Public,
    /// Working state only.
    Private,
}

/// Initial value for every node of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Initial `i64`.
    Long(i64),
    /// Initial `f64`.
    Double(f64),
    /// Initial `Vec<i64>`.
    LongArray(Vec<i64>),
    /// Initial `Vec<f64>`.
    DoubleArray(Vec<f64>),
}

impl DefaultValue {
    /// Value type of this default.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Long(_) => ValueType::Long,
            Self::Double(_) => ValueType::Double,
            Self::LongArray(_) => ValueType::LongArray,
            Self::DoubleArray(_) => ValueType::DoubleArray,
        }
    }
}

/// One declared property.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    key: String,
    value_type: ValueType,
    visibility: Visibility,
    default_value: Option<DefaultValue>,
}

impl Element {
    /// Property key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Value type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Visibility.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Initial value, if not zero/empty.
    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default_value.as_ref()
    }
}

/// Ordered mapping from property key to type and visibility.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PregelSchema {
    elements: Vec<Element>,
}

impl PregelSchema {
    /// Starts an empty schema.
    pub fn builder() -> PregelSchemaBuilder {
        PregelSchemaBuilder::default()
    }

    /// Declared properties in declaration order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Number of declared properties.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Finds a property by key.
    pub fn element(&self, key: &str) -> Option<&Element> {
        self.position(key).map(|i| &self.elements[i])
    }

    /// Resolves a typed handle for `key`.
    ///
    /// # Errors
    /// [`PregelError::UnknownProperty`] if `key` is not declared and
    /// [`PregelError::PropertyTypeMismatch`] if it is declared with another type.
    pub fn key<T: PropertyType>(&self, key: &str) -> Result<PropertyKey<T>> {
        let index = self
            .position(key)
            .ok_or_else(|| PregelError::UnknownProperty(key.to_owned()))?;
        let declared = self.elements[index].value_type;
        if declared != T::VALUE_TYPE {
            return Err(PregelError::PropertyTypeMismatch {
                key: key.to_owned(),
                declared,
                requested: T::VALUE_TYPE,
            });
        }
        Ok(PropertyKey {
            index,
            _marker: PhantomData,
        })
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.key == key)
    }
}

/// Builder for [`PregelSchema`].
#[derive(Debug, Default)]
pub struct PregelSchemaBuilder {
    elements: Vec<Element>,
}

impl PregelSchemaBuilder {
    /// Declares a public property initialized to zero/empty.
    #[must_use]
    pub fn add(self, key: impl Into<String>, value_type: ValueType) -> Self {
        self.add_with_visibility(key, value_type, Visibility::Public)
    }

    /// Declares a property initialized to zero/empty.
    #[must_use]
    pub fn add_with_visibility(
        self,
        key: impl Into<String>,
        value_type: ValueType,
        visibility: Visibility,
    ) -> Self {
        self.push(Element {
            key: key.into(),
            value_type,
            visibility,
            default_value: None,
        })
    }

    /// Declares a property whose type and initial value come from `default_value`.
    #[must_use]
    pub fn add_with_default(
        self,
        key: impl Into<String>,
        default_value: DefaultValue,
        visibility: Visibility,
    ) -> Self {
        self.push(Element {
            key: key.into(),
            value_type: default_value.value_type(),
            visibility,
            default_value: Some(default_value),
        })
    }

    /// Re-declaring a key replaces the earlier declaration in place.
    fn push(mut self, element: Element) -> Self {
        match self.elements.iter_mut().find(|e| e.key == element.key) {
            Some(existing) => *existing = element,
            None => self.elements.push(element),
        }
        self
    }

    /// Finishes the schema.
    pub fn build(self) -> PregelSchema {
        PregelSchema {
            elements: self.elements,
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
    impl Sealed for Vec<i64> {}
    impl Sealed for Vec<f64> {}
}

/// Rust types that can back a node property column.
pub trait PropertyType: sealed::Sealed {
    /// Schema type of this Rust type.
    const VALUE_TYPE: ValueType;
}

impl PropertyType for i64 {
    const VALUE_TYPE: ValueType = ValueType::Long;
}

impl PropertyType for f64 {
    const VALUE_TYPE: ValueType = ValueType::Double;
}

impl PropertyType for Vec<i64> {
    const VALUE_TYPE: ValueType = ValueType::LongArray;
}

impl PropertyType for Vec<f64> {
    const VALUE_TYPE: ValueType = ValueType::DoubleArray;
}

/// A property key resolved against a schema.
pub struct PropertyKey<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PropertyKey<T> {
    /// Column index in the schema the key was resolved against.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for PropertyKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PropertyKey<T> {}

impl<T> PartialEq for PropertyKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for PropertyKey<T> {}

impl<T: PropertyType> fmt::Debug for PropertyKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyKey")
            .field("index", &self.index)
            .field("value_type", &T::VALUE_TYPE)
            .finish()
    }
}

/// Anything that names a column of type `T`: a resolved [`PropertyKey`] or a `&str`.
///
/// String keys are looked up on every access and panic when the key is not
/// declared with type `T`; resolve them once with [`PregelSchema::key`] for hot loops.
pub trait ColumnKey<T: PropertyType> {
    /// Column index of this key in `schema`.
    fn column_index(&self, schema: &PregelSchema) -> usize;
}

impl<T: PropertyType> ColumnKey<T> for PropertyKey<T> {
    #[inline(always)]
    fn column_index(&self, _schema: &PregelSchema) -> usize {
        self.index
    }
}

impl<T: PropertyType> ColumnKey<T> for str {
    fn column_index(&self, schema: &PregelSchema) -> usize {
        match schema.key::<T>(self) {
            Ok(key) => key.index,
            Err(e) => panic!("{e}"),
        }
    }
}
