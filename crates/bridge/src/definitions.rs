//! Data definition table.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use simlink_proto::{DataType, DefinitionId, FieldSpec};

use crate::engine::Connection;
use crate::error::{BridgeError, Result};
use crate::ids::Registries;

/// A field as the decoder sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedField {
	pub name: String,
	pub data_type: DataType,
}

/// An ordered, named, typed field list registered with the engine.
///
/// Field order matches the engine's serialization order. Definitions are
/// never mutated or destroyed once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDefinition {
	pub id: DefinitionId,
	pub fields: Vec<DefinedField>,
}

impl DataDefinition {
	/// Builds a definition locally, without the engine.
	pub fn from_fields<N: Into<String>>(id: DefinitionId, fields: impl IntoIterator<Item = (N, DataType)>) -> Self {
		Self {
			id,
			fields: fields
				.into_iter()
				.map(|(name, data_type)| DefinedField {
					name: name.into(),
					data_type,
				})
				.collect(),
		}
	}
}

#[derive(Debug, Default)]
pub(crate) struct DefinitionTable {
	definitions: RwLock<HashMap<DefinitionId, Arc<DataDefinition>>>,
}

impl DefinitionTable {
	/// Registers `fields` with the engine and records the definition.
	pub(crate) fn create<C: Connection>(&self, ids: &Registries, conn: &C, fields: &[FieldSpec]) -> Result<DefinitionId> {
		let definition = define(ids, conn, fields)?;
		let id = definition.id;
		self.definitions.write().insert(id, Arc::new(definition));
		Ok(id)
	}

	pub(crate) fn get(&self, id: DefinitionId) -> Option<Arc<DataDefinition>> {
		self.definitions.read().get(&id).cloned()
	}

	pub(crate) fn lookup(&self, id: DefinitionId) -> Result<Arc<DataDefinition>> {
		self.get(id).ok_or(BridgeError::UnknownDefinition(id))
	}
}

/// Validates `fields`, allocates an id and forwards one add-field call per
/// field in order.
///
/// On the first engine failure the id is burned and fields already added on
/// the engine side stay there.
pub(crate) fn define<C: Connection>(ids: &Registries, conn: &C, fields: &[FieldSpec]) -> Result<DataDefinition> {
	validate(fields)?;
	let id = ids.allocate_definition_id();
	for field in fields {
		conn.add_to_data_definition(id, field).map_err(|status| {
			tracing::debug!(definition_id = id.0, field = %field.name, %status, "registry.definition.abandoned");
			BridgeError::Status {
				op: "add_to_data_definition",
				status,
			}
		})?;
	}
	tracing::trace!(definition_id = id.0, fields = fields.len(), "registry.definition.created");
	Ok(DataDefinition {
		id,
		fields: fields
			.iter()
			.map(|f| DefinedField {
				name: f.name.clone(),
				data_type: f.data_type,
			})
			.collect(),
	})
}

fn validate(fields: &[FieldSpec]) -> Result<()> {
	if fields.is_empty() {
		return Err(BridgeError::InvalidDefinition("field list is empty".to_owned()));
	}
	if let Some(index) = fields.iter().position(|f| f.name.is_empty()) {
		return Err(BridgeError::InvalidDefinition(format!("field {index} has an empty name")));
	}
	Ok(())
}
