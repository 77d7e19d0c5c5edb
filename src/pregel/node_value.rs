//! Column-oriented per-node property storage.
//!
//! One column per schema element, each a dense array of length `node_count`
//! indexed by node id. Scalar columns are atomics accessed with relaxed ordering;
//! array columns are [`PartitionedCells`]. During a superstep a node's cells are
//! only written by the partition that owns the node, so no cell is ever contended;
//! the barrier between supersteps publishes all writes.

use core::sync::atomic::{AtomicI64, Ordering};

use crate::concurrency::{AtomicDouble, PartitionedCells};
use crate::mem::MemoryEstimation;

use super::schema::{ColumnKey, DefaultValue, PregelSchema, ValueType, Visibility};

enum Column {
    Long(Box<[AtomicI64]>),
    Double(Box<[AtomicDouble]>),
    LongArray(PartitionedCells<Vec<i64>>),
    DoubleArray(PartitionedCells<Vec<f64>>),
}

impl Column {
    fn allocate(value_type: ValueType, default: Option<&DefaultValue>, node_count: usize) -> Self {
        match (value_type, default) {
            (ValueType::Long, d) => {
                let v = match d {
                    Some(DefaultValue::Long(v)) => *v,
                    _ => 0,
                };
                Self::Long((0..node_count).map(|_| AtomicI64::new(v)).collect())
            }
            (ValueType::Double, d) => {
                let v = match d {
                    Some(DefaultValue::Double(v)) => *v,
                    _ => 0.0,
                };
                Self::Double((0..node_count).map(|_| AtomicDouble::new(v)).collect())
            }
            (ValueType::LongArray, d) => {
                let v = match d {
                    Some(DefaultValue::LongArray(v)) => v.clone(),
                    _ => Vec::new(),
                };
                Self::LongArray(PartitionedCells::from_fn(node_count, |_| v.clone()))
            }
            (ValueType::DoubleArray, d) => {
                let v = match d {
                    Some(DefaultValue::DoubleArray(v)) => v.clone(),
                    _ => Vec::new(),
                };
                Self::DoubleArray(PartitionedCells::from_fn(node_count, |_| v.clone()))
            }
        }
    }

    fn value_type(&self) -> ValueType {
        match self {
            Self::Long(_) => ValueType::Long,
            Self::Double(_) => ValueType::Double,
            Self::LongArray(_) => ValueType::LongArray,
            Self::DoubleArray(_) => ValueType::DoubleArray,
        }
    }
}

macro_rules! column_accessor {
    ($name:ident, $name_mut:ident, $variant:ident, $ty:ty) => {
        #[inline(always)]
        fn $name(&self, index: usize) -> &$ty {
            match &self.columns[index] {
                Column::$variant(c) => c,
                other => type_panic(&self.schema, index, ValueType::$variant, other.value_type()),
            }
        }

        #[inline(always)]
        fn $name_mut(&mut self, index: usize) -> &mut $ty {
            match &mut self.columns[index] {
                Column::$variant(c) => c,
                other => {
                    let found = other.value_type();
                    type_panic(&self.schema, index, ValueType::$variant, found)
                }
            }
        }
    };
}

#[cold]
#[inline(never)]
fn type_panic(schema: &PregelSchema, index: usize, expected: ValueType, found: ValueType) -> ! {
    let key = schema.elements().get(index).map_or("<unknown>", |e| e.key());
    panic!("property `{key}` is {found:?}, not {expected:?}")
}

/// Per-node property values for every schema element.
pub struct NodeValue {
    schema: PregelSchema,
    node_count: usize,
    columns: Vec<Column>,
}

impl NodeValue {
    /// Allocates one column per schema element, filled with the element's default
    /// value or zero/empty.
    pub fn new(schema: PregelSchema, node_count: usize) -> Self {
        let columns = schema
            .elements()
            .iter()
            .map(|e| Column::allocate(e.value_type(), e.default_value(), node_count))
            .collect();
        Self {
            schema,
            node_count,
            columns,
        }
    }

    /// Structural memory estimation for `schema`, one component per property.
    pub fn memory_estimation(schema: &PregelSchema) -> MemoryEstimation {
        let mut builder = MemoryEstimation::builder("node value");
        for e in schema.elements() {
            let per_node = match e.value_type() {
                ValueType::Long => core::mem::size_of::<AtomicI64>(),
                ValueType::Double => core::mem::size_of::<AtomicDouble>(),
                ValueType::LongArray => core::mem::size_of::<Vec<i64>>(),
                ValueType::DoubleArray => core::mem::size_of::<Vec<f64>>(),
            };
            builder = builder.per_node(e.key(), per_node);
        }
        builder.build()
    }

    /// The schema the columns were allocated from.
    pub fn schema(&self) -> &PregelSchema {
        &self.schema
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Keys of public properties, in schema order.
    pub fn public_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.schema
            .elements()
            .iter()
            .filter(|e| e.visibility() == Visibility::Public)
            .map(|e| e.key())
    }

    column_accessor!(long_column, long_column_mut, Long, Box<[AtomicI64]>);
    column_accessor!(double_column, double_column_mut, Double, Box<[AtomicDouble]>);
    column_accessor!(long_array_column, long_array_column_mut, LongArray, PartitionedCells<Vec<i64>>);
    column_accessor!(double_array_column, double_array_column_mut, DoubleArray, PartitionedCells<Vec<f64>>);

    /// `i64` value of `node`.
    #[inline]
    pub fn long_value<K: ColumnKey<i64> + ?Sized>(&self, key: &K, node: usize) -> i64 {
        self.long_column(key.column_index(&self.schema))[node].load(Ordering::Relaxed)
    }

    /// `f64` value of `node`.
    #[inline]
    pub fn double_value<K: ColumnKey<f64> + ?Sized>(&self, key: &K, node: usize) -> f64 {
        self.double_column(key.column_index(&self.schema))[node].load(Ordering::Relaxed)
    }

    /// `i64` array of `node`.
    #[inline]
    pub fn long_array_value<K: ColumnKey<Vec<i64>> + ?Sized>(&self, key: &K, node: usize) -> &[i64] {
        self.long_array_column(key.column_index(&self.schema)).get(node)
    }

    /// `f64` array of `node`.
    #[inline]
    pub fn double_array_value<K: ColumnKey<Vec<f64>> + ?Sized>(&self, key: &K, node: usize) -> &[f64] {
        self.double_array_column(key.column_index(&self.schema)).get(node)
    }

    /// Sets the `i64` value of `node`.
    #[inline]
    pub fn set_long<K: ColumnKey<i64> + ?Sized>(&mut self, key: &K, node: usize, value: i64) {
        let index = key.column_index(&self.schema);
        *self.long_column_mut(index)[node].get_mut() = value;
    }

    /// Sets the `f64` value of `node`.
    #[inline]
    pub fn set_double<K: ColumnKey<f64> + ?Sized>(&mut self, key: &K, node: usize, value: f64) {
        let index = key.column_index(&self.schema);
        self.double_column_mut(index)[node].store(value, Ordering::Relaxed);
    }

    /// Sets the `i64` array of `node`.
    #[inline]
    pub fn set_long_array<K: ColumnKey<Vec<i64>> + ?Sized>(&mut self, key: &K, node: usize, value: Vec<i64>) {
        let index = key.column_index(&self.schema);
        *self.long_array_column_mut(index).get_mut(node) = value;
    }

    /// Sets the `f64` array of `node`.
    #[inline]
    pub fn set_double_array<K: ColumnKey<Vec<f64>> + ?Sized>(&mut self, key: &K, node: usize, value: Vec<f64>) {
        let index = key.column_index(&self.schema);
        *self.double_array_column_mut(index).get_mut(node) = value;
    }

    /// All `i64` values of a column in node-id order.
    pub fn longs<K: ColumnKey<i64> + ?Sized>(&self, key: &K) -> impl Iterator<Item = i64> + '_ {
        self.long_column(key.column_index(&self.schema))
            .iter()
            .map(|v| v.load(Ordering::Relaxed))
    }

    /// All `f64` values of a column in node-id order.
    pub fn doubles<K: ColumnKey<f64> + ?Sized>(&self, key: &K) -> impl Iterator<Item = f64> + '_ {
        self.double_column(key.column_index(&self.schema))
            .iter()
            .map(|v| v.load(Ordering::Relaxed))
    }

    // Owner-partition writes. Callers are the compute/init contexts, which only
    // ever pass the id of the node their partition is currently processing.

    #[inline]
    pub(crate) fn set_long_owned<K: ColumnKey<i64> + ?Sized>(&self, key: &K, node: usize, value: i64) {
        self.long_column(key.column_index(&self.schema))[node].store(value, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn set_double_owned<K: ColumnKey<f64> + ?Sized>(&self, key: &K, node: usize, value: f64) {
        self.double_column(key.column_index(&self.schema))[node].store(value, Ordering::Relaxed);
    }

    /// # Safety
    /// The calling partition must own `node` and hold no borrow of its array.
    #[inline]
    pub(crate) unsafe fn set_long_array_owned<K: ColumnKey<Vec<i64>> + ?Sized>(
        &self,
        key: &K,
        node: usize,
        value: Vec<i64>,
    ) {
        // SAFETY: forwarded from the caller.
        unsafe {
            self.long_array_column(key.column_index(&self.schema))
                .set_shared(node, value);
        }
    }

    /// # Safety
    /// The calling partition must own `node` and hold no borrow of its array.
    #[inline]
    pub(crate) unsafe fn set_double_array_owned<K: ColumnKey<Vec<f64>> + ?Sized>(
        &self,
        key: &K,
        node: usize,
        value: Vec<f64>,
    ) {
        // SAFETY: forwarded from the caller.
        unsafe {
            self.double_array_column(key.column_index(&self.schema))
                .set_shared(node, value);
        }
    }
}

impl core::fmt::Debug for NodeValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeValue")
            .field("node_count", &self.node_count)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pregel::schema::PropertyKey;

    fn values() -> NodeValue {
        let schema = PregelSchema::builder()
            .add_with_default("rank", DefaultValue::Double(0.15), Visibility::Public)
            .add_with_visibility("seen", ValueType::Long, Visibility::Private)
            .add("path", ValueType::LongArray)
            .add_with_default("vec", DefaultValue::DoubleArray(vec![1.0, 2.0]), Visibility::Public)
            .build();
        NodeValue::new(schema, 4)
    }

    #[test]
    fn columns_start_at_defaults_or_zero() {
        let v = values();
        assert_eq!(v.node_count(), 4);
        assert!(v.doubles("rank").all(|r| r == 0.15));
        assert!(v.longs("seen").all(|s| s == 0));
        assert!(v.long_array_value("path", 3).is_empty());
        assert_eq!(v.double_array_value("vec", 2), &[1.0, 2.0]);
    }

    #[test]
    fn set_and_get_through_resolved_keys() {
        let mut v = values();
        let rank: PropertyKey<f64> = v.schema().key("rank").unwrap();
        let path: PropertyKey<Vec<i64>> = v.schema().key("path").unwrap();

        v.set_double(&rank, 1, 0.5);
        v.set_long("seen", 2, 7);
        v.set_long_array(&path, 0, vec![3, 2, 1]);
        v.set_double_array("vec", 3, vec![]);

        assert_eq!(v.double_value(&rank, 1), 0.5);
        assert_eq!(v.long_value("seen", 2), 7);
        assert_eq!(v.long_array_value(&path, 0), &[3, 2, 1]);
        assert!(v.double_array_value("vec", 3).is_empty());
        assert_eq!(v.doubles(&rank).collect::<Vec<_>>(), vec![0.15, 0.5, 0.15, 0.15]);
    }

    #[test]
    fn owned_writes_from_disjoint_threads() {
        let v = values();
        std::thread::scope(|s| {
            for part in 0..2usize {
                let v = &v;
                s.spawn(move || {
                    for node in (part * 2)..(part * 2 + 2) {
                        v.set_double_owned("rank", node, node as f64);
                        // SAFETY: this thread is the only one touching `node`.
                        unsafe { v.set_long_array_owned("path", node, vec![node as i64]) };
                    }
                });
            }
        });
        assert_eq!(v.doubles("rank").collect::<Vec<_>>(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(v.long_array_value("path", 3), &[3]);
    }

    #[test]
    fn public_keys_skip_private() {
        let v = values();
        assert_eq!(v.public_keys().collect::<Vec<_>>(), vec!["rank", "path", "vec"]);
    }

    #[test]
    #[should_panic(expected = "not declared")]
    fn undeclared_key_panics() {
        values().double_value("missing", 0);
    }

    #[test]
    fn estimation_has_one_component_per_property() {
        let v = values();
        let estimation = NodeValue::memory_estimation(v.schema());
        assert_eq!(estimation.components().len(), 4);
        let tree = estimation.estimate(crate::mem::GraphDimensions::new(10, 0), 1);
        assert_eq!(tree.component("rank").unwrap().memory_usage().max(), 80);
    }
}
