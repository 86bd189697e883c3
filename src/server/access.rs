//! # Listas de Acceso por Ruta
//! src/server/access.rs
//!
//! Dos conjuntos de rutas canónicas absolutas: las *ocultas* se
//! responden como 404 (indistinguibles de un archivo inexistente, para
//! no revelar que existen) y las *prohibidas* como 403.
//!
//! Se pueblan una sola vez al arrancar y después son de solo lectura,
//! así que los handlers las consultan sin locking.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Archivos que, de existir bajo la raíz, se registran solos
const DEFAULT_HIDDEN_FILE: &str = "hidden.html";
const DEFAULT_FORBIDDEN_FILE: &str = "forbidden.html";

/// Formato del archivo JSON opcional de listas de acceso
///
/// Las rutas son relativas al directorio raíz:
/// `{"hidden": ["secreto.html"], "forbidden": ["privado/datos.txt"]}`
#[derive(Debug, Deserialize)]
struct AccessListsFile {
    #[serde(default)]
    hidden: Vec<String>,

    #[serde(default)]
    forbidden: Vec<String>,
}

/// Conjuntos de rutas ocultas y prohibidas
#[derive(Debug, Default)]
pub struct AccessLists {
    hidden: HashSet<PathBuf>,
    forbidden: HashSet<PathBuf>,
}

impl AccessLists {
    /// Crea listas vacías
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye las listas al arrancar el servidor
    ///
    /// Registra `hidden.html` y `forbidden.html` bajo la raíz si
    /// existen, y después suma las entradas del archivo JSON opcional
    /// (`lists_path` vacío lo omite). Las rutas que no existen al
    /// arrancar se saltan con una advertencia: la canonicalización
    /// exige que existan.
    pub fn load(root_dir: &str, lists_path: &str) -> Self {
        let mut lists = Self::new();

        // Ejemplos por convención, igual que la raíz los traiga o no
        lists.hide(Path::new(root_dir).join(DEFAULT_HIDDEN_FILE));
        lists.forbid(Path::new(root_dir).join(DEFAULT_FORBIDDEN_FILE));

        if lists_path.is_empty() {
            return lists;
        }

        match fs::read_to_string(lists_path) {
            Ok(contents) => match serde_json::from_str::<AccessListsFile>(&contents) {
                Ok(file) => {
                    for entry in file.hidden {
                        lists.hide(Path::new(root_dir).join(entry));
                    }
                    for entry in file.forbidden {
                        lists.forbid(Path::new(root_dir).join(entry));
                    }
                }
                Err(e) => eprintln!("   ❌ Access lists inválidas en {}: {}", lists_path, e),
            },
            Err(e) => eprintln!("   ❌ No se pudo leer {}: {}", lists_path, e),
        }

        lists
    }

    /// Registra una ruta como oculta (404)
    ///
    /// Se ignora en silencio si la ruta no existe todavía.
    pub fn hide(&mut self, path: impl AsRef<Path>) {
        if let Ok(canonical) = fs::canonicalize(path.as_ref()) {
            self.hidden.insert(canonical);
        }
    }

    /// Registra una ruta como prohibida (403)
    pub fn forbid(&mut self, path: impl AsRef<Path>) {
        if let Ok(canonical) = fs::canonicalize(path.as_ref()) {
            self.forbidden.insert(canonical);
        }
    }

    /// Verifica si una ruta canónica está oculta
    pub fn is_hidden(&self, canonical: &Path) -> bool {
        self.hidden.contains(canonical)
    }

    /// Verifica si una ruta canónica está prohibida
    pub fn is_forbidden(&self, canonical: &Path) -> bool {
        self.forbidden.contains(canonical)
    }

    /// Cantidad de entradas registradas (ocultas + prohibidas)
    pub fn len(&self) -> usize {
        self.hidden.len() + self.forbidden.len()
    }

    /// Verifica si no hay ninguna entrada registrada
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fs_access_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_empty_lists() {
        let lists = AccessLists::new();
        assert!(lists.is_empty());
        assert!(!lists.is_hidden(Path::new("/cualquier/cosa")));
        assert!(!lists.is_forbidden(Path::new("/cualquier/cosa")));
    }

    #[test]
    fn test_hide_and_forbid_existing_files() {
        let root = temp_root("hf");
        let secret = root.join("secreto.html");
        let private = root.join("privado.html");
        fs::write(&secret, b"x").unwrap();
        fs::write(&private, b"y").unwrap();

        let mut lists = AccessLists::new();
        lists.hide(&secret);
        lists.forbid(&private);

        let secret_canonical = fs::canonicalize(&secret).unwrap();
        let private_canonical = fs::canonicalize(&private).unwrap();

        assert!(lists.is_hidden(&secret_canonical));
        assert!(!lists.is_forbidden(&secret_canonical));
        assert!(lists.is_forbidden(&private_canonical));
        assert!(!lists.is_hidden(&private_canonical));

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_nonexistent_paths_are_skipped() {
        let mut lists = AccessLists::new();
        lists.hide("/no/existe/para/nada.html");
        assert!(lists.is_empty());
    }

    #[test]
    fn test_load_registers_conventional_files() {
        let root = temp_root("conv");
        fs::write(root.join("hidden.html"), b"h").unwrap();
        fs::write(root.join("forbidden.html"), b"f").unwrap();

        let lists = AccessLists::load(root.to_str().unwrap(), "");

        let hidden = fs::canonicalize(root.join("hidden.html")).unwrap();
        let forbidden = fs::canonicalize(root.join("forbidden.html")).unwrap();
        assert!(lists.is_hidden(&hidden));
        assert!(lists.is_forbidden(&forbidden));

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_load_from_json_file() {
        let root = temp_root("json");
        fs::write(root.join("secreto.html"), b"s").unwrap();
        fs::write(root.join("privado.html"), b"p").unwrap();

        let lists_path = root.join("access.json");
        fs::write(
            &lists_path,
            br#"{"hidden": ["secreto.html"], "forbidden": ["privado.html"]}"#,
        )
        .unwrap();

        let lists = AccessLists::load(root.to_str().unwrap(), lists_path.to_str().unwrap());

        let secret = fs::canonicalize(root.join("secreto.html")).unwrap();
        let private = fs::canonicalize(root.join("privado.html")).unwrap();
        assert!(lists.is_hidden(&secret));
        assert!(lists.is_forbidden(&private));

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_load_with_invalid_json_does_not_panic() {
        let root = temp_root("bad");
        let lists_path = root.join("access.json");
        fs::write(&lists_path, b"esto no es json").unwrap();

        let lists = AccessLists::load(root.to_str().unwrap(), lists_path.to_str().unwrap());
        assert!(lists.is_empty());

        fs::remove_dir_all(&root).unwrap();
    }
}
