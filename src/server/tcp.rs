//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Implementación del dispatcher: acepta conexiones TCP, aplica el
//! control de admisión en línea y lanza un
//! [`ConnectionHandler`](crate::server::handler::ConnectionHandler) en
//! su propio thread por cada conexión admitida. No hay pool ni cola:
//! los threads son ilimitados y el dispatcher no los rastrea ni los
//! espera.
//!
//! El shutdown es best-effort: `stop()` marca el flag y abre una
//! conexión dummy al puerto propio para desbloquear el `accept()`; los
//! handlers en vuelo terminan solos.

use crate::cache::FileCache;
use crate::config::Config;
use crate::server::access::AccessLists;
use crate::server::dos::{BlacklistSweeper, DosGuard};
use crate::server::handler::ConnectionHandler;
use crate::server::stats::ServiceStats;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Servidor HTTP/1.x de archivos estáticos
///
/// Dueño del estado compartido (cache, admisión, estadísticas, listas
/// de acceso); cada handler recibe referencias `Arc` a todo.
pub struct Server {
    config: Config,
    cache: Arc<FileCache>,
    dos: Arc<DosGuard>,
    stats: Arc<ServiceStats>,
    access: Arc<AccessLists>,
    stop: AtomicBool,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl Server {
    /// Construye el servidor a partir de la configuración
    pub fn new(config: Config) -> Self {
        let access = AccessLists::load(&config.root_dir, &config.access_lists_path);

        Self {
            cache: Arc::new(FileCache::new(config.max_cached_files)),
            dos: Arc::new(DosGuard::new(config.rate_limit_per_sec, config.blacklist_ms)),
            stats: Arc::new(ServiceStats::new()),
            access: Arc::new(access),
            stop: AtomicBool::new(false),
            local_addr: Mutex::new(None),
            config,
        }
    }

    /// Estadísticas compartidas, para observadores externos
    pub fn stats(&self) -> Arc<ServiceStats> {
        Arc::clone(&self.stats)
    }

    /// Hace bind en la dirección configurada y atiende conexiones
    ///
    /// Bloquea el thread actual hasta que alguien llame a `stop()`.
    pub fn run(&self) -> std::io::Result<()> {
        let address = self.config.address();
        println!("[*] Iniciando servidor en {}", address);

        let listener = TcpListener::bind(&address)?;
        println!("[+] Servidor escuchando en {}", address);
        println!("[*] Modo concurrente: un thread por conexión\n");

        self.serve(listener)
    }

    /// Loop de accept sobre un listener ya creado
    pub fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        *self.local_addr.lock().unwrap() = Some(listener.local_addr()?);

        // Barrido periódico de la blacklist en segundo plano
        let mut sweeper = BlacklistSweeper::start(
            Arc::clone(&self.dos),
            Duration::from_millis(self.config.sweep_interval_ms),
        );

        for stream in listener.incoming() {
            match stream {
                Ok(socket) => {
                    // La conexión dummy de stop() cae acá
                    if self.stop.load(Ordering::SeqCst) {
                        break;
                    }

                    let peer_ip = match socket.peer_addr() {
                        Ok(addr) => addr.ip(),
                        Err(e) => {
                            eprintln!("   ❌ Conexión sin dirección de peer: {}", e);
                            continue;
                        }
                    };

                    // Control de admisión antes de gastar un thread;
                    // rechazo = cerrar el socket sin respuesta
                    if self.dos.should_reject(peer_ip) {
                        println!("   🚫 Conexión de {} rechazada (rate limit)", peer_ip);
                        drop(socket);
                        continue;
                    }

                    println!("   ✅ Nueva conexión desde {} (spawning thread)", peer_ip);

                    let handler = ConnectionHandler::new(
                        socket,
                        self.config.root_dir.clone(),
                        Duration::from_millis(self.config.read_timeout_ms),
                        Arc::clone(&self.cache),
                        Arc::clone(&self.dos),
                        Arc::clone(&self.stats),
                        Arc::clone(&self.access),
                    );
                    thread::spawn(move || handler.run());
                }
                Err(e) => {
                    // Listener cerrado durante stop() es un cierre normal
                    if self.stop.load(Ordering::SeqCst) {
                        break;
                    }
                    eprintln!("   ❌ Error al aceptar conexión: {}", e);
                    log_fault(&self.config.log_path, &format!("accept failed: {}", e));
                }
            }
        }

        sweeper.stop();

        match self.stats.service_rate() {
            Some(rate) => println!("[*] Servidor detenido ({:.2} conexiones/seg)", rate),
            None => println!("[*] Servidor detenido"),
        }
        Ok(())
    }

    /// Detiene el loop de accept (best-effort)
    ///
    /// No interrumpe handlers en vuelo; solo evita aceptar conexiones
    /// nuevas. Idempotente.
    pub fn stop(&self) {
        if self.stop.swap(true, Ordering::SeqCst) {
            return;
        }

        // Conexión dummy para sacar al accept() de su bloqueo
        let addr = *self.local_addr.lock().unwrap();
        if let Some(addr) = addr {
            if let Err(e) = TcpStream::connect(addr) {
                log_fault(&self.config.log_path, &format!("stop connect failed: {}", e));
            }
        }
    }

    /// Verifica si el servidor fue detenido
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Registra un fallo inesperado en el log persistente del servidor
///
/// Los fallos de accept/shutdown no tumban el proceso; quedan en el
/// archivo para análisis posterior.
fn log_fault(path: &str, message: &str) {
    use std::io::Write;

    let stamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
    match std::fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(mut file) => {
            let _ = writeln!(file, "[{}] {}", stamp, message);
        }
        Err(e) => eprintln!("   ❌ No se pudo escribir el log {}: {}", path, e),
    }
}
