// index_table.rs
use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Índices secundarios de la instalación de referencia, en el orden en que el
/// driver nocturno los archiva.
static REFERENCE_NAMES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["jd_objectId",
         "pixel128_jd",
         "pixel4096_jd",
         "pixel131072_jd",
         "class_jd_objectId",
         "upper_objectId_jd",
         "ssnamenr_jd",
         "uppervalid_objectId_jd",
         "tracklet_objectId"]
});

/// Índice opcional sobre el cruce con TNS.
pub const TNS_INDEX: &str = "tns_jd";

/// Descriptor de una tabla de índice secundaria.
///
/// El nombre lógico codifica las columnas de ordenación de la clave separadas
/// por `_`: `class_jd_objectId` ordena por clase, luego `jd`, luego
/// `objectId`. Todas las tablas de índice contienen el mismo conjunto lógico
/// de filas que la tabla primaria para una noche; sólo cambia la clave.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IndexTableDescriptor {
    name: String,
    key_columns: Vec<String>,
}

impl IndexTableDescriptor {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::InvalidIndexTable("nombre vacío".to_string()));
        }
        if let Some(c) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
            return Err(DomainError::InvalidIndexTable(format!("'{name}' contiene el carácter no permitido '{c}'")));
        }
        let key_columns: Vec<String> = name.split('_').map(str::to_string).collect();
        if key_columns.iter().any(String::is_empty) {
            return Err(DomainError::InvalidIndexTable(format!("'{name}' tiene una columna de clave vacía")));
        }
        Ok(Self { name, key_columns })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columnas de ordenación de la clave, en orden.
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// Nombre físico de la tabla en el almacenamiento: `<base>.<primera columna>`.
    pub fn physical_table(&self, base: &str) -> String {
        format!("{base}.{}", self.key_columns[0])
    }
}

impl fmt::Display for IndexTableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl TryFrom<String> for IndexTableDescriptor {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IndexTableDescriptor> for String {
    fn from(d: IndexTableDescriptor) -> Self {
        d.name
    }
}

/// Conjunto ordenado, no vacío y sin duplicados de tablas de índice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTableSet {
    tables: Vec<IndexTableDescriptor>,
}

impl IndexTableSet {
    /// # Errores
    /// `DomainError::InvalidIndexTable` si el conjunto está vacío o repite un
    /// nombre.
    pub fn new<I>(descriptors: I) -> Result<Self, DomainError>
        where I: IntoIterator<Item = IndexTableDescriptor>
    {
        let tables: Vec<IndexTableDescriptor> = descriptors.into_iter().collect();
        if tables.is_empty() {
            return Err(DomainError::InvalidIndexTable("el conjunto de índices no puede estar vacío".to_string()));
        }
        let mut seen = HashSet::new();
        for t in &tables {
            if !seen.insert(t.name()) {
                return Err(DomainError::InvalidIndexTable(format!("índice duplicado: {}", t.name())));
            }
        }
        Ok(Self { tables })
    }

    pub fn from_names<I, S>(names: I) -> Result<Self, DomainError>
        where I: IntoIterator<Item = S>,
              S: AsRef<str>
    {
        let descriptors = names.into_iter()
                               .map(|n| IndexTableDescriptor::new(n.as_ref().trim()))
                               .collect::<Result<Vec<_>, _>>()?;
        Self::new(descriptors)
    }

    /// Los nueve índices de referencia, más `tns_jd` si se solicita.
    pub fn reference(include_tns: bool) -> Self {
        let mut tables: Vec<IndexTableDescriptor> = REFERENCE_NAMES.iter()
                                                                   .map(|n| IndexTableDescriptor { name: n.to_string(),
                                                                                                   key_columns: n.split('_').map(str::to_string).collect() })
                                                                   .collect();
        if include_tns {
            tables.push(IndexTableDescriptor { name: TNS_INDEX.to_string(),
                                               key_columns: TNS_INDEX.split('_').map(str::to_string).collect() });
        }
        Self { tables }
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexTableDescriptor> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name()).collect()
    }
}

impl<'a> IntoIterator for &'a IndexTableSet {
    type Item = &'a IndexTableDescriptor;
    type IntoIter = std::slice::Iter<'a, IndexTableDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_columns_follow_name() {
        let d = IndexTableDescriptor::new("class_jd_objectId").unwrap();
        assert_eq!(d.key_columns(), ["class", "jd", "objectId"]);
        assert_eq!(d.physical_table("ztf"), "ztf.class");
    }

    #[test]
    fn rejects_bad_names() {
        for bad in ["", "pixel-128", "_jd", "jd__objectId", "jd_", "ztf.jd"] {
            assert!(IndexTableDescriptor::new(bad).is_err(), "{bad} debería rechazarse");
        }
    }

    #[test]
    fn reference_set_order_and_tns() {
        let set = IndexTableSet::reference(false);
        assert_eq!(set.len(), 9);
        assert_eq!(set.names()[0], "jd_objectId");
        assert_eq!(set.names()[8], "tracklet_objectId");
        let with_tns = IndexTableSet::reference(true);
        assert_eq!(with_tns.len(), 10);
        assert_eq!(with_tns.names().last().copied(), Some(TNS_INDEX));
    }

    #[test]
    fn set_rejects_empty_and_duplicates() {
        assert!(IndexTableSet::from_names(Vec::<String>::new()).is_err());
        let err = IndexTableSet::from_names(["pixel128_jd", "pixel128_jd"]).unwrap_err();
        assert!(err.to_string().contains("duplicado"));
    }
}
