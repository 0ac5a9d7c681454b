//! Generic CRUD shared by the typed property entities
//!
//! A [`DerivedProperty`] contributes two things: its `_propertytype` tag and
//! the payload type whose [`Serializer`] decides the document shape. The
//! functions below never look at the entity type otherwise.

use bson::{doc, Document};
use tracing::debug;

use chemdb_core::{Error, Id, Model, Result};
use chemdb_storage::{CollectionPtr, FindOptions};

use crate::fields;
use crate::object::{id_filter, DatabaseObject};
use crate::serializer::Serializer;

pub(crate) const PROPERTY_TYPE_FIELD: &str = "_propertytype";
pub(crate) const PROPERTY_NAME: &str = "property_name";
pub(crate) const MODEL: &str = "model";
pub(crate) const COMMENT: &str = "comment";
pub(crate) const STRUCTURE: &str = "structure";
pub(crate) const CALCULATION: &str = "calculation";

/// A property entity bound to one payload type
pub trait DerivedProperty: DatabaseObject {
    /// Value of the `_propertytype` discriminator
    const PROPERTY_TYPE: &'static str;

    /// Payload type
    type Data: Serializer;
}

/// Insert a new property document and return a handle on it
///
/// # Errors
/// Returns `Error::MissingCollection` if `collection` is `None`.
pub fn create<D: DerivedProperty>(
    collection: Option<&CollectionPtr>,
    model: &Model,
    property_name: &str,
    data: &D::Data,
    structure: Option<Id>,
    calculation: Option<Id>,
) -> Result<D> {
    let collection = collection.ok_or(Error::MissingCollection)?;
    let doc = property_document::<D>(model, property_name, data, structure, calculation);
    let id = collection.insert_one(doc)?;
    debug!(
        target: "chemdb::property",
        %id,
        property_type = D::PROPERTY_TYPE,
        property_name,
        "created property"
    );
    Ok(D::from_parts(Some(id), Some(collection.clone())))
}

fn property_document<D: DerivedProperty>(
    model: &Model,
    property_name: &str,
    data: &D::Data,
    structure: Option<Id>,
    calculation: Option<Id>,
) -> Document {
    let now = bson::DateTime::now();
    let mut doc = doc! {
        "_created": now,
        "_lastmodified": now,
        "analysis_disabled": false,
        "exploration_disabled": false,
        "_objecttype": D::OBJECT_TYPE,
        "_propertytype": D::PROPERTY_TYPE,
        "model": model.to_document(),
        "property_name": property_name,
    };
    data.serialize(&mut doc);
    doc.insert(COMMENT, "");
    if let Some(structure) = structure {
        doc.insert(STRUCTURE, structure);
    }
    if let Some(calculation) = calculation {
        doc.insert(CALCULATION, calculation);
    }
    doc
}

/// Replace the payload fields of an existing property
pub fn update_data<D: DerivedProperty>(property: &D, data: &D::Data) -> Result<()> {
    let object = property.object();
    let id = object.target()?.1;
    let mut assignment = Document::new();
    data.serialize(&mut assignment);
    debug!(target: "chemdb::property", %id, property_type = D::PROPERTY_TYPE, "update data");
    fields::write(object, doc! { "$set": assignment })
}

/// Read the payload of an existing property
///
/// # Errors
/// Returns `Error::MissingIdOrField` if the document or a payload field is
/// absent.
pub fn get_data<D: DerivedProperty>(property: &D) -> Result<D::Data> {
    let (collection, id) = property.object().target()?;
    debug!(target: "chemdb::property", %id, property_type = D::PROPERTY_TYPE, "get data");
    let doc = collection
        .find_one(&id_filter(id), FindOptions::projected(D::Data::projection()))?
        .ok_or(Error::MissingIdOrField)?;
    D::Data::deserialize(&doc)
}
