//! # Handler de Conexión
//! src/server/handler.rs
//!
//! Lógica por conexión aceptada: lee uno o más requests del socket
//! (conexiones persistentes), resuelve cada uno a una ruta del
//! filesystem, aplica las reglas de cache/visibilidad/frescura y escribe
//! la respuesta. Corre en su propio thread, lanzado por el dispatcher.
//!
//! Ningún fallo de una conexión se propaga fuera del handler: todo se
//! resuelve en el borde con una respuesta de error o un cierre de
//! socket, y la conexión siempre queda registrada en las estadísticas.

use crate::cache::FileCache;
use crate::http::{self, ReadError, Request, Response};
use crate::server::access::AccessLists;
use crate::server::dos::DosGuard;
use crate::server::stats::ServiceStats;
use std::io::{BufReader, ErrorKind};
use std::net::{Shutdown, TcpStream};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Atiende una conexión TCP aceptada
pub struct ConnectionHandler {
    socket: TcpStream,
    root_dir: String,
    read_timeout: Duration,
    cache: Arc<FileCache>,
    dos: Arc<DosGuard>,
    stats: Arc<ServiceStats>,
    access: Arc<AccessLists>,
}

impl ConnectionHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        socket: TcpStream,
        root_dir: String,
        read_timeout: Duration,
        cache: Arc<FileCache>,
        dos: Arc<DosGuard>,
        stats: Arc<ServiceStats>,
        access: Arc<AccessLists>,
    ) -> Self {
        Self {
            socket,
            root_dir,
            read_timeout,
            cache,
            dos,
            stats,
            access,
        }
    }

    /// Punto de entrada del handler
    ///
    /// Pase lo que pase adentro, al terminar se suma 1 conexión y el
    /// tiempo transcurrido a las estadísticas compartidas.
    pub fn run(mut self) {
        let start = Instant::now();
        self.serve();
        self.stats.record(1, start.elapsed().as_millis() as u64);
    }

    /// Loop de requests sobre la conexión (persistente o no)
    fn serve(&mut self) {
        if let Err(e) = self.socket.set_read_timeout(Some(self.read_timeout)) {
            eprintln!("   ❌ No se pudo fijar el timeout de lectura: {}", e);
        }

        let peer_ip = match self.socket.peer_addr() {
            Ok(addr) => addr.ip(),
            Err(e) => {
                eprintln!("   ❌ Sin dirección del peer: {}", e);
                return;
            }
        };

        let mut reader = match self.socket.try_clone() {
            Ok(clone) => BufReader::new(clone),
            Err(e) => {
                eprintln!("   ❌ No se pudo clonar el socket: {}", e);
                return;
            }
        };

        loop {
            // 1. Leer exactamente un request
            let request = match Request::read(&mut reader) {
                Ok(request) => request,
                Err(ReadError::Closed) => return,
                Err(ReadError::Timeout) => {
                    self.write_or_fallback(Response::request_timeout());
                    return;
                }
                Err(ReadError::BadRequest(reason)) => {
                    println!("   ❌ Request malformado de {}: {}", peer_ip, reason);
                    self.write_or_fallback(Response::bad_request());
                    return;
                }
                Err(ReadError::Other(reason)) => {
                    // Fallback conservador: cualquier otro fallo de lectura es un 400
                    eprintln!("   ❌ Error leyendo request de {}: {}", peer_ip, reason);
                    self.write_or_fallback(Response::bad_request());
                    return;
                }
            };

            // 2. Re-chequeo de admisión por request: una ráfaga sobre una
            //    conexión persistente también debe quedar limitada.
            //    Rechazo silencioso: se cierra sin escribir respuesta.
            if self.dos.should_reject(peer_ip) {
                println!("   🚫 Request de {} rechazado por rate limit", peer_ip);
                let _ = self.socket.shutdown(Shutdown::Both);
                return;
            }

            println!("   ✅ {} {} desde {}", request.method(), request.uri(), peer_ip);

            // 3. Construir la respuesta
            let (response, persistent) = self.respond_to(&request);

            // 4. Escribir y decidir si la conexión sigue viva
            self.write_or_fallback(response);

            if !persistent {
                let _ = self.socket.shutdown(Shutdown::Both);
                return;
            }
        }
    }

    /// Decide la respuesta para un request ya leído y admitido
    ///
    /// Retorna la respuesta y si la conexión queda persistente.
    fn respond_to(&self, request: &Request) -> (Response, bool) {
        // Versión distinta de la soportada → 505 dedicado
        if !request.version().eq_ignore_ascii_case(http::VERSION) {
            return (Response::version_not_supported(), false);
        }

        // Único método implementado: GET
        if !request.method().eq_ignore_ascii_case(http::GET) {
            return (Response::not_implemented(), false);
        }

        self.respond_to_get(request)
    }

    /// Resolución de un GET: ruta, visibilidad, directorio, frescura
    fn respond_to_get(&self, request: &Request) -> (Response, bool) {
        // Persistente solo si el header connection trae el token keep-alive
        let persistent = request
            .header("connection")
            .map_or(false, |v| v.eq_ignore_ascii_case(http::KEEP_ALIVE));
        let connection = if persistent {
            http::CONNECTION_OPEN
        } else {
            http::CONNECTION_CLOSE
        };

        // Ruta absoluta = raíz + URI del request
        let resolved = PathBuf::from(format!("{}{}", self.root_dir, request.uri()));
        if !resolved.exists() {
            return (Response::not_found(connection), persistent);
        }

        let canonical = match std::fs::canonicalize(&resolved) {
            Ok(canonical) => canonical,
            // Desapareció entre el exists() y acá
            Err(_) => return (Response::not_found(connection), persistent),
        };

        // Oculta: misma respuesta que un archivo inexistente, a propósito
        if self.access.is_hidden(&canonical) {
            return (Response::not_found(connection), persistent);
        }
        if self.access.is_forbidden(&canonical) {
            return (Response::forbidden(connection), persistent);
        }

        // Directorio: buscar el archivo índice adentro
        let file = if canonical.is_dir() {
            let index = canonical.join(http::DEFAULT_FILE);
            if !index.exists() {
                return (Response::not_found(connection), persistent);
            }
            index
        } else {
            canonical
        };

        // GET condicional: igualdad textual del mtime formateado contra
        // if-modified-since; cualquier diferencia produce el 200 completo
        let mtime = match std::fs::metadata(&file).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(_) => return (Response::not_found(connection), persistent),
        };
        let last_modified = http::format_last_modified(mtime);

        if request.header("if-modified-since") == Some(last_modified.as_str()) {
            (Response::not_modified(connection), persistent)
        } else {
            (Response::ok_with_file(&file, connection), persistent)
        }
    }

    /// Escribe la respuesta al socket, con fallback si el cuerpo falló
    ///
    /// Si el archivo de un 200 desapareció entre el chequeo de
    /// existencia y la lectura vía cache, todavía no se emitió ni un
    /// byte, así que se sustituye por un 404 en vez de mandar un cuerpo
    /// corrupto. Los errores de escritura solo se loguean.
    fn write_or_fallback(&mut self, response: Response) {
        match response.write(&mut self.socket, Some(&self.cache)) {
            Ok(()) => {}
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
                println!("   ❌ Archivo ilegible al servirlo, sustituyendo 404: {}", e);
                let fallback = Response::not_found(response.connection());
                if let Err(e) = fallback.write(&mut self.socket, None) {
                    eprintln!("   ❌ Error escribiendo el 404 de fallback: {}", e);
                }
            }
            Err(e) => eprintln!("   ❌ Error escribiendo respuesta: {}", e),
        }
    }
}
