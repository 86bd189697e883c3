//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor de archivos con soporte
//! completo para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./file_server --port 8080 \
//!   --root-dir ./web \
//!   --max-cached-files 20 \
//!   --rate-limit 100
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 ROOT_DIR=/var/www ./file_server
//! ```

use clap::Parser;

/// Configuración del servidor HTTP/1.x de archivos estáticos
#[derive(Debug, Clone, Parser)]
#[command(name = "file_server")]
#[command(about = "Servidor HTTP/1.x concurrente de archivos estáticos")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio raíz desde el que se sirven archivos
    #[arg(long = "root-dir", default_value = "./web", env = "ROOT_DIR")]
    pub root_dir: String,

    // === Cache ===

    /// Número máximo de archivos en el cache en memoria (LRU)
    #[arg(long = "max-cached-files", default_value = "20", env = "MAX_CACHED_FILES")]
    pub max_cached_files: usize,

    // === Mitigación de DoS ===

    /// Máximo de requests por segundo por IP antes de ir a la blacklist
    #[arg(long = "rate-limit", default_value = "100", env = "RATE_LIMIT")]
    pub rate_limit_per_sec: u32,

    /// Tiempo que una IP permanece en la blacklist, en milisegundos
    #[arg(long = "blacklist-ms", default_value = "900000", env = "BLACKLIST_MS")]
    pub blacklist_ms: u64,

    /// Intervalo del barrido que purga entradas expiradas de la blacklist, en milisegundos
    #[arg(long = "sweep-interval-ms", default_value = "600000", env = "SWEEP_INTERVAL_MS")]
    pub sweep_interval_ms: u64,

    // === Timeouts ===

    /// Timeout de lectura por conexión en milisegundos
    #[arg(long = "read-timeout-ms", default_value = "5000", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    // === Listas de acceso ===

    /// Archivo JSON opcional con rutas ocultas y prohibidas
    /// Formato: {"hidden": ["secreto.html"], "forbidden": ["privado.html"]}
    #[arg(long = "access-lists", default_value = "", env = "ACCESS_LISTS")]
    pub access_lists_path: String,

    // === Log ===

    /// Archivo de log para fallos inesperados durante accept/shutdown
    #[arg(long = "log", default_value = "./server.log", env = "SERVER_LOG")]
    pub log_path: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use file_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        // Validar cache
        if self.max_cached_files == 0 {
            return Err("Max cached files must be >= 1".to_string());
        }

        // Validar rate limiting
        if self.rate_limit_per_sec == 0 {
            return Err("Rate limit must be >= 1".to_string());
        }
        if self.blacklist_ms == 0 {
            return Err("Blacklist duration must be > 0".to_string());
        }
        if self.sweep_interval_ms == 0 {
            return Err("Sweep interval must be > 0".to_string());
        }

        // Validar timeout
        if self.read_timeout_ms == 0 {
            return Err("Read timeout must be > 0".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║              File Server HTTP/1.x Configuration               ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Root dir:     {}", self.root_dir);
        println!("   Log:          {}", self.log_path);
        println!();
        println!("📦 Cache:");
        println!("   Max files:    {}", self.max_cached_files);
        println!();
        println!("🚦 DoS Mitigation:");
        println!("   Rate limit:   {} req/sec per IP", self.rate_limit_per_sec);
        println!("   Blacklist:    {} ms ({:.1} min)",
            self.blacklist_ms, self.blacklist_ms as f64 / 60_000.0);
        println!("   Sweep every:  {} ms ({:.1} min)",
            self.sweep_interval_ms, self.sweep_interval_ms as f64 / 60_000.0);
        println!();
        println!("⏱️  Timeouts:");
        println!("   Read timeout: {} ms", self.read_timeout_ms);

        if !self.access_lists_path.is_empty() {
            println!();
            println!("🔒 Access lists: {}", self.access_lists_path);
        }

        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            root_dir: "./web".to_string(),
            max_cached_files: 20,
            rate_limit_per_sec: 100,
            blacklist_ms: 900_000,
            sweep_interval_ms: 600_000,
            read_timeout_ms: 5_000,
            access_lists_path: String::new(),
            log_path: "./server.log".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.max_cached_files, 20);
        assert_eq!(config.rate_limit_per_sec, 100);
        assert_eq!(config.blacklist_ms, 900_000);
        assert_eq!(config.sweep_interval_ms, 600_000);
    }

    #[test]
    fn test_address() {
        let config = Config::default();
        assert_eq!(config.address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "0.0.0.0".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    // ==================== Cache Validation ====================

    #[test]
    fn test_validate_invalid_cache_capacity() {
        let mut config = Config::default();
        config.max_cached_files = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Max cached files"));
    }

    // ==================== Rate Limit Validation ====================

    #[test]
    fn test_validate_invalid_rate_limit() {
        let mut config = Config::default();
        config.rate_limit_per_sec = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Rate limit"));
    }

    #[test]
    fn test_validate_invalid_blacklist_duration() {
        let mut config = Config::default();
        config.blacklist_ms = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Blacklist"));
    }

    #[test]
    fn test_validate_invalid_sweep_interval() {
        let mut config = Config::default();
        config.sweep_interval_ms = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Sweep interval"));
    }

    // ==================== Timeout Validation ====================

    #[test]
    fn test_validate_invalid_read_timeout() {
        let mut config = Config::default();
        config.read_timeout_ms = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Read timeout"));
    }

    // ==================== Custom Values ====================

    #[test]
    fn test_config_custom_values() {
        let mut config = Config::default();
        config.port = 3000;
        config.host = "0.0.0.0".to_string();
        config.root_dir = "/var/www".to_string();
        config.max_cached_files = 50;
        config.rate_limit_per_sec = 200;

        assert_eq!(config.port, 3000);
        assert_eq!(config.root_dir, "/var/www");
        assert_eq!(config.max_cached_files, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_access_lists_path() {
        let mut config = Config::default();
        assert!(config.access_lists_path.is_empty());
        config.access_lists_path = "./access.json".to_string();
        assert_eq!(config.access_lists_path, "./access.json");
    }

    // ==================== Print Summary ====================

    #[test]
    fn test_config_print_summary() {
        let config = Config::default();
        // Should not panic
        config.print_summary();
    }
}
