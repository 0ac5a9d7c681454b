//! Property entities
//!
//! [`Property`] gives access to the fields every property document shares.
//! The six typed properties add the payload, each bound to one
//! [`Serializer`](crate::serializer::Serializer) type, and deref to
//! `Property`.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CscMatrix;

use chemdb_core::{Error, Id, Model, Result};
use chemdb_storage::CollectionPtr;

use crate::derived_property::{
    self, DerivedProperty, CALCULATION, COMMENT, MODEL, PROPERTY_NAME, PROPERTY_TYPE_FIELD,
    STRUCTURE,
};
use crate::fields;
use crate::object::{database_object, DatabaseObject, Object};

database_object!(
    /// Property of any payload type
    Property,
    "property"
);

impl Property {
    /// Name of the property (e.g. `electronic_energy`)
    pub fn property_name(&self) -> Result<String> {
        fields::get(self, PROPERTY_NAME)
    }

    /// Rename the property
    pub fn set_property_name(&self, name: &str) -> Result<()> {
        fields::set(self, PROPERTY_NAME, &name.to_string())
    }

    /// Stored `_propertytype` tag
    pub fn property_type(&self) -> Result<String> {
        fields::get(self, PROPERTY_TYPE_FIELD)
    }

    /// Whether the stored payload type is that of `D`
    pub fn is_of_type<D: DerivedProperty>(&self) -> Result<bool> {
        Ok(self.property_type()? == D::PROPERTY_TYPE)
    }

    /// Typed handle on the same document
    ///
    /// # Errors
    /// Returns `Error::ObjectTypeMismatch` if the stored payload type differs.
    pub fn get_derived<D: DerivedProperty>(&self) -> Result<D> {
        let found = self.property_type()?;
        if found != D::PROPERTY_TYPE {
            return Err(Error::ObjectTypeMismatch {
                expected: D::PROPERTY_TYPE.to_string(),
                found,
            });
        }
        let (id, collection) = self.object.parts();
        Ok(D::from_parts(id, collection))
    }

    /// Model the property was obtained with
    pub fn model(&self) -> Result<Model> {
        fields::get(self, MODEL)
    }

    /// Replace the model
    pub fn set_model(&self, model: &Model) -> Result<()> {
        fields::set(self, MODEL, model)
    }

    /// Structure the property belongs to
    pub fn structure(&self) -> Result<Id> {
        fields::get(self, STRUCTURE)
    }

    /// Structure the property belongs to, if any
    pub fn partial_structure(&self) -> Result<Option<Id>> {
        fields::partial_get(self, STRUCTURE)
    }

    /// Whether a structure is referenced
    pub fn has_structure(&self) -> Result<bool> {
        fields::exists(self, STRUCTURE)
    }

    /// Reference a structure
    pub fn set_structure(&self, structure: Id) -> Result<()> {
        fields::set(self, STRUCTURE, &structure)
    }

    /// Drop the structure reference
    pub fn clear_structure(&self) -> Result<()> {
        fields::unset(self, STRUCTURE)
    }

    /// Calculation that produced the property
    pub fn calculation(&self) -> Result<Id> {
        fields::get(self, CALCULATION)
    }

    /// Calculation that produced the property, if any
    pub fn partial_calculation(&self) -> Result<Option<Id>> {
        fields::partial_get(self, CALCULATION)
    }

    /// Whether a calculation is referenced
    pub fn has_calculation(&self) -> Result<bool> {
        fields::exists(self, CALCULATION)
    }

    /// Reference a calculation
    pub fn set_calculation(&self, calculation: Id) -> Result<()> {
        fields::set(self, CALCULATION, &calculation)
    }

    /// Drop the calculation reference
    pub fn clear_calculation(&self) -> Result<()> {
        fields::unset(self, CALCULATION)
    }

    /// Free-form comment
    pub fn comment(&self) -> Result<String> {
        fields::get(self, COMMENT)
    }

    /// Replace the comment
    pub fn set_comment(&self, comment: &str) -> Result<()> {
        fields::set(self, COMMENT, &comment.to_string())
    }

    /// Whether a non-empty comment is stored
    pub fn has_comment(&self) -> Result<bool> {
        fields::non_null(self, COMMENT)
    }

    /// Reset the comment to the empty string
    pub fn clear_comment(&self) -> Result<()> {
        fields::set(self, COMMENT, &String::new())
    }
}

macro_rules! derived_property {
    ($(#[$meta:meta])* $name:ident, $tag:expr, $data:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            property: Property,
        }

        impl DatabaseObject for $name {
            const OBJECT_TYPE: &'static str = <Property as DatabaseObject>::OBJECT_TYPE;

            fn from_parts(id: Option<Id>, collection: Option<CollectionPtr>) -> Self {
                Self {
                    property: Property::from_parts(id, collection),
                }
            }

            fn object(&self) -> &Object {
                self.property.object()
            }

            fn object_mut(&mut self) -> &mut Object {
                self.property.object_mut()
            }
        }

        impl DerivedProperty for $name {
            const PROPERTY_TYPE: &'static str = $tag;
            type Data = $data;
        }

        impl $name {
            /// Handle on an existing document
            pub fn new(id: Id, collection: CollectionPtr) -> Self {
                Self::from_parts(Some(id), Some(collection))
            }

            /// Insert a new property
            pub fn create(
                property_name: &str,
                model: &Model,
                data: &$data,
                collection: &CollectionPtr,
            ) -> Result<Self> {
                derived_property::create(Some(collection), model, property_name, data, None, None)
            }

            /// Insert a new property referencing its structure and calculation
            pub fn create_with_references(
                property_name: &str,
                model: &Model,
                data: &$data,
                structure: Id,
                calculation: Id,
                collection: &CollectionPtr,
            ) -> Result<Self> {
                derived_property::create(
                    Some(collection),
                    model,
                    property_name,
                    data,
                    Some(structure),
                    Some(calculation),
                )
            }

            /// Stored payload
            pub fn get_data(&self) -> Result<$data> {
                derived_property::get_data(self)
            }

            /// Replace the payload
            pub fn set_data(&self, data: &$data) -> Result<()> {
                derived_property::update_data(self, data)
            }
        }

        impl std::ops::Deref for $name {
            type Target = Property;

            fn deref(&self) -> &Self::Target {
                &self.property
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.property
            }
        }
    };
}

derived_property!(
    /// Boolean property
    BoolProperty,
    "bool_property",
    bool
);
derived_property!(
    /// Scalar property (energies, ...)
    NumberProperty,
    "number_property",
    f64
);
derived_property!(
    /// String property
    StringProperty,
    "string_property",
    String
);
derived_property!(
    /// Dense vector property (charges, ...)
    VectorProperty,
    "vector_property",
    DVector<f64>
);
derived_property!(
    /// Dense matrix property (gradients, Hessians, ...)
    DenseMatrixProperty,
    "dense_matrix_property",
    DMatrix<f64>
);
derived_property!(
    /// Sparse matrix property (bond orders, ...)
    SparseMatrixProperty,
    "sparse_matrix_property",
    CscMatrix<f64>
);
