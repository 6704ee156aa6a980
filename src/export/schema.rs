// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema derivation and column flattening.
//!
//! A column whose cells are fixed-width arrays of `k > 1` elements becomes
//! `k` scalar columns `{name}_1 .. {name}_k`, in place. The same
//! [`Flattener`] that produced the schema flattens every data row, so the
//! schema's field names are exactly the keys of every row object.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::{CellValue, Result};
use crate::io::metadata::ColumnInfo;
use crate::io::traits::TableSource;

/// One exported (flattened) field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Field name, unique within the schema
    pub name: String,
    /// Table-schema type name (`integer`, `number`, `string`, `boolean`)
    #[serde(rename = "type")]
    pub field_type: String,
    /// Physical unit, if declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Table-schema-like description of an export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// Fields in export order
    pub fields: Vec<Field>,
}

impl Schema {
    /// Field names in export order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Output names for one native column.
#[derive(Debug, Clone)]
struct FlatColumn {
    names: Vec<String>,
}

/// Maps decoded native rows onto flattened JSON row objects.
#[derive(Debug, Clone)]
pub struct Flattener {
    columns: Vec<FlatColumn>,
    schema: Schema,
}

impl Flattener {
    /// Build a flattener for native columns with the given element widths.
    ///
    /// Names that collide after flattening get `.1`, `.2`, ... appended to
    /// the later occurrences.
    pub fn new(columns: &[&ColumnInfo], widths: &[usize]) -> Self {
        let mut used = HashSet::new();
        let mut flat = Vec::with_capacity(columns.len());
        let mut fields = Vec::new();

        for (column, &width) in columns.iter().zip(widths) {
            let candidates: Vec<String> = if width > 1 {
                (1..=width).map(|i| format!("{}_{i}", column.name)).collect()
            } else {
                vec![column.name.clone()]
            };

            let names: Vec<String> = candidates
                .into_iter()
                .map(|name| unique_name(name, &mut used))
                .collect();

            for name in &names {
                fields.push(Field {
                    name: name.clone(),
                    field_type: column.scalar_type.table_schema_type().to_string(),
                    unit: column.unit.clone(),
                });
            }
            flat.push(FlatColumn { names });
        }

        Self {
            columns: flat,
            schema: Schema { fields },
        }
    }

    /// The derived schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Flatten one decoded row into a JSON object.
    ///
    /// Every schema field is present in the result; missing elements are
    /// `null`. Extra elements are dropped.
    pub fn flatten_row(&self, cells: Vec<CellValue>) -> Map<String, Value> {
        let mut row = Map::with_capacity(self.schema.len());
        let mut cells = cells.into_iter();

        for column in &self.columns {
            let cell = cells.next().unwrap_or(CellValue::Null);
            if let [name] = column.names.as_slice() {
                row.insert(name.clone(), cell.to_json());
                continue;
            }

            let mut elements = cell.into_elements().into_iter();
            for name in &column.names {
                let value = elements.next().map(|e| e.to_json()).unwrap_or(Value::Null);
                row.insert(name.clone(), value);
            }
        }

        row
    }
}

fn unique_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{name}.{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Derive the flattened schema for the selected native columns.
///
/// Array widths come from a one-row probe; a table without rows falls
/// back to the declared widths.
///
/// # Errors
///
/// Propagates any decode error raised by the probe read.
pub fn derive_schema(table: &dyn TableSource, selected: &[usize]) -> Result<Flattener> {
    let all = table.columns();
    let columns: Vec<&ColumnInfo> = selected.iter().map(|&i| &all[i]).collect();

    let widths: Vec<usize> = if table.num_rows() > 0 {
        let probe = table.read_rows(0..1, selected)?;
        match probe.first() {
            Some(cells) => cells.iter().map(|c| c.width().max(1)).collect(),
            None => columns.iter().map(|c| c.dimensionality.max(1)).collect(),
        }
    } else {
        columns.iter().map(|c| c.dimensionality.max(1)).collect()
    };

    let flattener = Flattener::new(&columns, &widths);
    debug!(
        context = "derive_schema",
        native_columns = columns.len(),
        fields = flattener.schema().len(),
        "Derived schema"
    );

    Ok(flattener)
}
