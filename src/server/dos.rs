//! # Control de Admisión (Mitigación de DoS)
//! src/server/dos.rs
//!
//! Contador de requests por IP sobre épocas de un segundo, más una
//! blacklist con expiración. Una IP que supera el umbral dentro de la
//! época actual entra a la blacklist por la duración configurada.
//!
//! El contador se limpia *completo* al cruzar a un nuevo segundo (no es
//! una ventana deslizante): una ráfaga justo en el borde de época puede
//! admitir hasta 2× el umbral nominal en poco tiempo real. Es una
//! aproximación aceptada del diseño, no una garantía estricta de tasa.
//!
//! La expiración de la blacklist se verifica en cada decisión, así que
//! la corrección no depende del barrido periódico: ese solo acota la
//! memoria purgando entradas ya expiradas.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milisegundos desde el epoch Unix
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Estado interno del controlador, protegido por un solo mutex
struct DosState {
    /// Época (segundo de reloj) a la que pertenecen los contadores
    last_second: u64,

    /// Requests contados por IP dentro de la época actual
    num_requests: HashMap<IpAddr, u32>,

    /// IP (en forma textual) → timestamp absoluto de expiración en ms
    blacklist: HashMap<String, u64>,
}

/// Controlador de admisión compartido entre el dispatcher y los handlers
///
/// Se consulta dos veces por conexión persistente: una al aceptar el
/// socket y otra por cada request leído, para que una ráfaga sobre una
/// sola conexión viva también quede limitada.
pub struct DosGuard {
    /// Umbral de requests por segundo por IP
    threshold: u32,

    /// Duración del baneo en milisegundos
    blacklist_ms: u64,

    state: Mutex<DosState>,
}

impl DosGuard {
    /// Crea un controlador con el umbral y duración de baneo dados
    pub fn new(threshold: u32, blacklist_ms: u64) -> Self {
        Self {
            threshold,
            blacklist_ms,
            state: Mutex::new(DosState {
                last_second: 0,
                num_requests: HashMap::new(),
                blacklist: HashMap::new(),
            }),
        }
    }

    /// Decide si la conexión/request de `addr` debe rechazarse
    ///
    /// Retorna `true` para rechazar. Al alcanzar el umbral, la IP entra
    /// a la blacklist y ese mismo request ya se rechaza.
    pub fn should_reject(&self, addr: IpAddr) -> bool {
        self.check_at(addr, now_ms())
    }

    /// Variante con reloj explícito, para decisiones deterministas en tests
    pub(crate) fn check_at(&self, addr: IpAddr, now_ms: u64) -> bool {
        let mut state = self.state.lock().unwrap();

        // 1. Blacklist vigente → rechazar (la expiración se mira aquí,
        //    sin esperar al barrido)
        if let Some(&expiry) = state.blacklist.get(&addr.to_string()) {
            if expiry > now_ms {
                return true;
            }
        }

        // 2. Nueva época → reset completo de contadores
        let current_second = now_ms / 1000;
        if current_second > state.last_second {
            state.num_requests.clear();
            state.last_second = current_second;
        }

        // 3. Incrementar y comparar contra el umbral
        let count = state.num_requests.entry(addr).or_insert(0);
        *count += 1;
        if *count >= self.threshold {
            state
                .blacklist
                .insert(addr.to_string(), now_ms + self.blacklist_ms);
            return true;
        }

        false
    }

    /// Purga las entradas de la blacklist cuya expiración ya pasó
    pub fn sweep_expired(&self) {
        self.sweep_expired_at(now_ms());
    }

    pub(crate) fn sweep_expired_at(&self, now_ms: u64) {
        let mut state = self.state.lock().unwrap();
        state.blacklist.retain(|_, &mut expiry| expiry > now_ms);
    }

    /// Número de entradas actualmente en la blacklist (expiradas o no)
    pub fn blacklist_len(&self) -> usize {
        self.state.lock().unwrap().blacklist.len()
    }
}

/// Barrido periódico de la blacklist en un thread de fondo
///
/// Tarea cancelable: duerme sobre un `Condvar` con timeout, de modo que
/// `stop()` la despierta de inmediato en lugar de esperar a que venza
/// el intervalo completo.
pub struct BlacklistSweeper {
    stop: Arc<(Mutex<bool>, Condvar)>,
    handle: Option<JoinHandle<()>>,
}

impl BlacklistSweeper {
    /// Arranca el barrido con el intervalo dado
    pub fn start(guard: Arc<DosGuard>, interval: Duration) -> Self {
        let stop = Arc::new((Mutex::new(false), Condvar::new()));
        let stop_clone = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let (lock, cvar) = &*stop_clone;
            let mut stopped = lock.lock().unwrap();
            loop {
                let (guard_lock, timeout) = cvar.wait_timeout(stopped, interval).unwrap();
                stopped = guard_lock;
                if *stopped {
                    break;
                }
                if timeout.timed_out() {
                    guard.sweep_expired();
                }
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Detiene el barrido y espera a que el thread termine
    pub fn stop(&mut self) {
        let (lock, cvar) = &*self.stop;
        {
            let mut stopped = lock.lock().unwrap();
            *stopped = true;
        }
        cvar.notify_all();

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for BlacklistSweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
