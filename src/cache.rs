//! # Cache de Archivos en Memoria
//! src/cache.rs
//!
//! Cache acotado de archivos leídos del disco, con política de desalojo
//! LRU (least-recently-used). Sirve para no releer del disco los
//! archivos calientes en cada request.
//!
//! El cache no sabe nada de HTTP ni de frescura: la detección de
//! modificaciones se hace más arriba comparando `If-Modified-Since`
//! contra el mtime actual del filesystem. Aquí solo viven bytes.

use lru::LruCache;
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Cache LRU de contenidos de archivo, keyed por ruta
///
/// Thread-safe: muchos handlers concurrentes comparten una sola
/// instancia vía `Arc`. Todo el bookkeeping LRU (promoción en hit,
/// desalojo en miss) ocurre dentro de una única sección crítica, así
/// que el orden nunca se corrompe por accesos intercalados.
pub struct FileCache {
    inner: Mutex<LruCache<PathBuf, Arc<Vec<u8>>>>,
}

impl FileCache {
    /// Crea un cache con capacidad fija de `max_files` entradas
    ///
    /// La capacidad no se ajusta sola a la memoria disponible; un valor
    /// de 0 se trata como 1.
    pub fn new(max_files: usize) -> Self {
        let capacity = NonZeroUsize::new(max_files.max(1)).unwrap();
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Obtiene el contenido completo de un archivo
    ///
    /// * **Hit**: la entrada se promueve a más-recientemente-usada y se
    ///   retornan sus bytes sin tocar el disco.
    /// * **Miss**: se lee el archivo completo; si el cache está lleno se
    ///   desaloja la entrada menos recientemente usada antes de insertar.
    ///
    /// # Errores
    ///
    /// Si la lectura falla (archivo desapareció, permisos, I/O) se
    /// retorna el error tal cual: nunca se entregan bytes vacíos o
    /// parciales, y el cache queda sin la entrada.
    ///
    /// # Ejemplo
    /// ```no_run
    /// use std::path::Path;
    /// use file_server::cache::FileCache;
    ///
    /// let cache = FileCache::new(20);
    /// let bytes = cache.get(Path::new("./web/index.html")).unwrap();
    /// println!("{} bytes", bytes.len());
    /// ```
    pub fn get(&self, path: &Path) -> io::Result<Arc<Vec<u8>>> {
        let mut lru = self.inner.lock().unwrap();

        // Hit: get() ya promueve la entrada a MRU
        if let Some(data) = lru.get(path) {
            return Ok(Arc::clone(data));
        }

        // Miss: leer del disco e insertar (push desaloja el LRU si hace falta)
        let data = Arc::new(fs::read(path)?);
        lru.push(path.to_path_buf(), Arc::clone(&data));
        Ok(data)
    }

    /// Número de entradas actualmente en el cache
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Verifica si el cache está vacío
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacidad máxima configurada
    pub fn capacity(&self) -> usize {
        self.inner.lock().unwrap().cap().get()
    }

    /// Verifica si una ruta está cacheada, sin alterar el orden LRU
    pub fn contains(&self, path: &Path) -> bool {
        self.inner.lock().unwrap().peek(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Directorio temporal único por test
    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fs_cache_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn make_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_miss_reads_from_disk() {
        let dir = temp_dir("miss");
        let file = make_file(&dir, "a.txt", b"contenido A");

        let cache = FileCache::new(5);
        let bytes = cache.get(&file).unwrap();

        assert_eq!(&bytes[..], b"contenido A");
        assert_eq!(cache.len(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_hit_never_rereads_disk() {
        let dir = temp_dir("hit");
        let file = make_file(&dir, "a.txt", b"version original");

        let cache = FileCache::new(5);
        let first = cache.get(&file).unwrap();

        // Borrar el archivo: un hit no debe tocar el disco
        fs::remove_file(&file).unwrap();

        let second = cache.get(&file).unwrap();
        assert_eq!(&second[..], b"version original");
        assert_eq!(first, second);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_read_failure_is_an_error_not_empty_bytes() {
        let cache = FileCache::new(5);
        let result = cache.get(Path::new("/no/existe/archivo.txt"));

        assert!(result.is_err());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let dir = temp_dir("cap");
        let cache = FileCache::new(3);

        for i in 0..10 {
            let file = make_file(&dir, &format!("f{}.txt", i), format!("{}", i).as_bytes());
            cache.get(&file).unwrap();
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.len(), 3);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_eviction_is_strictly_lru() {
        let dir = temp_dir("lru");
        let a = make_file(&dir, "a.txt", b"A");
        let b = make_file(&dir, "b.txt", b"B");
        let c = make_file(&dir, "c.txt", b"C");
        let d = make_file(&dir, "d.txt", b"D");

        let cache = FileCache::new(3);
        cache.get(&a).unwrap();
        cache.get(&b).unwrap();
        cache.get(&c).unwrap();

        // Tocar "a" la vuelve MRU; el LRU ahora es "b"
        cache.get(&a).unwrap();

        // Insertar "d" debe desalojar exactamente a "b"
        cache.get(&d).unwrap();

        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
        assert!(cache.contains(&d));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_zero_capacity_is_clamped_to_one() {
        let cache = FileCache::new(0);
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_concurrent_access_keeps_invariants() {
        let dir = temp_dir("conc");
        let mut files = Vec::new();
        for i in 0..8 {
            files.push(make_file(&dir, &format!("f{}.txt", i), &[i as u8; 64]));
        }

        let cache = Arc::new(FileCache::new(4));
        let mut handles = Vec::new();
        for t in 0..4 {
            let cache = Arc::clone(&cache);
            let files = files.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    let file = &files[(t + i) % files.len()];
                    let bytes = cache.get(file).unwrap();
                    assert_eq!(bytes.len(), 64);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 4);
        fs::remove_dir_all(&dir).unwrap();
    }
}
