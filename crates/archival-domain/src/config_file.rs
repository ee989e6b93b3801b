//! Fichero de configuración de los jobs (estilo `fink.conf`).
//!
//! El fichero es de sólo lectura para el orquestador: se resuelve una vez al
//! arrancar y la misma ruta se entrega sin modificar a cada job de la noche.
//! La lectura aquí sirve para validar (fail-fast) y para conocer algunos
//! valores útiles al operador (nombre de la tabla científica, nivel de log).
//!
//! Formato aceptado: líneas `KEY=VALUE` al estilo shell, con `export`
//! opcional, comillas simples o dobles y referencias `$VAR` / `${VAR}`. Las
//! referencias se resuelven contra claves anteriores del propio fichero y
//! después contra la instantánea de entorno que pasa el llamador; nunca se
//! consulta el entorno del proceso durante la ejecución.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};

use crate::DomainError;

/// Clave con el nombre de la tabla científica primaria.
pub const SCIENCE_TABLE_KEY: &str = "SCIENCE_DB_NAME";
pub const LOG_LEVEL_KEY: &str = "LOG_LEVEL";
pub const TRIGGER_INTERVAL_KEY: &str = "FINK_TRIGGER_UPDATE";

/// Configuración resuelta e inmutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    path: PathBuf,
    entries: IndexMap<String, String>,
}

impl ResolvedConfig {
    /// Lee y valida el fichero.
    ///
    /// # Errores
    /// `DomainError::Config` si el fichero no se puede leer, contiene una
    /// clave inválida o falta alguna de `required_keys`.
    pub fn load<S: AsRef<str>>(path: impl AsRef<Path>, env: &HashMap<String, String>, required_keys: &[S]) -> Result<Self, DomainError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DomainError::Config(format!("no existe el fichero de configuración {}", path.display())));
        }
        let text = std::fs::read_to_string(path).map_err(|e| DomainError::Config(format!("no se pudo leer {}: {e}", path.display())))?;
        let cfg = Self::parse(path.to_path_buf(), &text, env)?;
        cfg.require(required_keys)?;
        Ok(cfg)
    }

    /// Parseo puro (sin IO) del contenido del fichero.
    pub fn parse(path: PathBuf, text: &str, env: &HashMap<String, String>) -> Result<Self, DomainError> {
        let mut entries: IndexMap<String, String> = IndexMap::new();
        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                debug!("config {}:{}: línea ignorada (no es una asignación)", path.display(), lineno + 1);
                continue;
            };
            if key.is_empty() || key.chars().any(char::is_whitespace) {
                debug!("config {}:{}: línea ignorada (no es una asignación)", path.display(), lineno + 1);
                continue;
            }
            if !is_identifier(key) {
                return Err(DomainError::Config(format!("{}:{}: clave inválida '{key}'", path.display(), lineno + 1)));
            }
            let resolved = parse_value(value.trim(), &entries, env);
            entries.insert(key.to_string(), resolved);
        }
        Ok(Self { path, entries })
    }

    /// Comprueba que cada clave exista y no esté vacía.
    pub fn require<S: AsRef<str>>(&self, keys: &[S]) -> Result<(), DomainError> {
        for key in keys {
            let key = key.as_ref();
            match self.get(key) {
                Some(v) if !v.is_empty() => {}
                Some(_) => return Err(DomainError::Config(format!("la clave {key} está vacía en {}", self.path.display()))),
                None => return Err(DomainError::Config(format!("falta la clave {key} en {}", self.path.display()))),
            }
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn entries(&self) -> &IndexMap<String, String> {
        &self.entries
    }

    pub fn science_table(&self) -> Option<&str> {
        self.get(SCIENCE_TABLE_KEY)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.get(LOG_LEVEL_KEY)
    }

    /// Intervalo de disparo del streaming, en segundos.
    pub fn trigger_interval(&self) -> Option<u64> {
        self.get(TRIGGER_INTERVAL_KEY).and_then(|v| v.parse().ok())
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

fn parse_value(raw: &str, entries: &IndexMap<String, String>, env: &HashMap<String, String>) -> String {
    if let Some(inner) = raw.strip_prefix('\'') {
        if let Some(end) = inner.find('\'') {
            return inner[..end].to_string();
        }
    }
    if let Some(inner) = raw.strip_prefix('"') {
        if let Some(end) = inner.find('"') {
            return expand(&inner[..end], entries, env);
        }
    }
    let unquoted = match raw.find(" #") {
        Some(pos) => raw[..pos].trim_end(),
        None => raw,
    };
    expand(unquoted, entries, env)
}

fn expand(value: &str, entries: &IndexMap<String, String>, env: &HashMap<String, String>) -> String {
    let lookup = |name: &str| entries.get(name).or_else(|| env.get(name)).cloned();
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) if is_identifier(&braced[..end]) => (Some(&braced[..end]), end + 2),
                _ => (None, 0),
            }
        } else {
            let end = after.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_')).unwrap_or(after.len());
            if is_identifier(&after[..end]) { (Some(&after[..end]), end) } else { (None, 0) }
        };
        match name.map(|n| (n, lookup(n))) {
            Some((_, Some(v))) => {
                out.push_str(&v);
                rest = &after[consumed..];
            }
            Some((n, None)) => {
                warn!("referencia sin resolver ${n} en la configuración; se conserva literal");
                out.push('$');
                out.push_str(&after[..consumed]);
                rest = &after[consumed..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Configuración de prueba
export FINK_HOME=/opt/fink
HBASEIP=localhost
ZOOPORT=2181 # puerto zookeeper
SCIENCE_DB_NAME="ztf"
SCIENCE_DB_CATALOGS=${FINK_HOME}/catalogs_hbase
FINK_ALERT_SCHEMA=$FINK_SCHEMA/ztf.avsc
LITERAL='${NO_EXPANDIR}'
LOG_LEVEL=INFO
FINK_TRIGGER_UPDATE=2
if [ "$X" == "y" ]; then
fi
"#;

    fn parsed() -> ResolvedConfig {
        let env = HashMap::from([("FINK_SCHEMA".to_string(), "/schemas".to_string())]);
        ResolvedConfig::parse(PathBuf::from("fink.conf"), SAMPLE, &env).unwrap()
    }

    #[test]
    fn parses_assignments_in_order() {
        let cfg = parsed();
        let keys: Vec<&str> = cfg.entries().keys().map(String::as_str).collect();
        assert_eq!(keys[..3], ["FINK_HOME", "HBASEIP", "ZOOPORT"]);
        assert_eq!(cfg.get("ZOOPORT"), Some("2181"));
        assert_eq!(cfg.science_table(), Some("ztf"));
        assert_eq!(cfg.log_level(), Some("INFO"));
        assert_eq!(cfg.trigger_interval(), Some(2));
    }

    #[test]
    fn expands_file_keys_then_env_snapshot() {
        let cfg = parsed();
        assert_eq!(cfg.get("SCIENCE_DB_CATALOGS"), Some("/opt/fink/catalogs_hbase"));
        assert_eq!(cfg.get("FINK_ALERT_SCHEMA"), Some("/schemas/ztf.avsc"));
        assert_eq!(cfg.get("LITERAL"), Some("${NO_EXPANDIR}"));
    }

    #[test]
    fn unresolved_reference_is_kept_verbatim() {
        let cfg = ResolvedConfig::parse(PathBuf::from("x.conf"), "A=${MISSING}/x\nB=$$", &HashMap::new()).unwrap();
        assert_eq!(cfg.get("A"), Some("${MISSING}/x"));
        assert_eq!(cfg.get("B"), Some("$$"));
    }

    #[test]
    fn invalid_key_is_rejected() {
        let err = ResolvedConfig::parse(PathBuf::from("x.conf"), "BAD-KEY=1", &HashMap::new()).unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }

    #[test]
    fn require_reports_missing_and_empty() {
        let cfg = ResolvedConfig::parse(PathBuf::from("x.conf"), "EMPTY=\nFULL=1", &HashMap::new()).unwrap();
        assert!(cfg.require(&["FULL"]).is_ok());
        assert!(cfg.require(&["EMPTY"]).unwrap_err().to_string().contains("vacía"));
        assert!(cfg.require(&["ABSENT"]).unwrap_err().to_string().contains("falta"));
    }
}
