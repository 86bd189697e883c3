//! # Estadísticas de Servicio
//! src/server/stats.rs
//!
//! Totales acumulados de conexiones atendidas y tiempo de servicio.
//! Cada handler registra su conexión al terminar (éxito, error o
//! timeout, da igual); cualquier observador puede leer la tasa de
//! servicio en cualquier momento.

use serde::Serialize;
use std::sync::Mutex;

/// Totales internos, protegidos por un mutex
struct StatsData {
    /// Conexiones atendidas desde el arranque
    connections: u64,

    /// Milisegundos de servicio acumulados entre todas las conexiones
    service_time_ms: u64,
}

/// Estadísticas de servicio thread-safe
///
/// Compartidas vía `Arc` entre el dispatcher y todos los handlers.
pub struct ServiceStats {
    inner: Mutex<StatsData>,
}

/// Snapshot serializable de las estadísticas (para reportes)
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub connections: u64,
    pub service_time_ms: u64,
    /// Conexiones por segundo; `None` mientras no haya tiempo acumulado
    pub service_rate: Option<f64>,
}

impl ServiceStats {
    /// Crea estadísticas en cero
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StatsData {
                connections: 0,
                service_time_ms: 0,
            }),
        }
    }

    /// Registra una conexión terminada y su duración
    pub fn record(&self, connections: u64, elapsed_ms: u64) {
        let mut data = self.inner.lock().unwrap();
        data.connections += connections;
        data.service_time_ms += elapsed_ms;
    }

    /// Conexiones atendidas hasta ahora
    pub fn connections(&self) -> u64 {
        self.inner.lock().unwrap().connections
    }

    /// Tiempo de servicio acumulado en milisegundos
    pub fn service_time_ms(&self) -> u64 {
        self.inner.lock().unwrap().service_time_ms
    }

    /// Tasa de servicio: conexiones por segundo
    ///
    /// Retorna `None` mientras el tiempo acumulado sea cero (recién
    /// arrancado), para no dividir por cero.
    pub fn service_rate(&self) -> Option<f64> {
        let data = self.inner.lock().unwrap();
        if data.service_time_ms == 0 {
            return None;
        }
        Some(data.connections as f64 / data.service_time_ms as f64 * 1000.0)
    }

    /// Obtiene un snapshot consistente de los totales
    pub fn snapshot(&self) -> StatsSnapshot {
        let data = self.inner.lock().unwrap();
        let service_rate = if data.service_time_ms == 0 {
            None
        } else {
            Some(data.connections as f64 / data.service_time_ms as f64 * 1000.0)
        };
        StatsSnapshot {
            connections: data.connections,
            service_time_ms: data.service_time_ms,
            service_rate,
        }
    }

    /// Serializa el snapshot actual a JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.snapshot())
            .unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for ServiceStats {
    fn default() -> Self {
        Self::new()
    }
}
