//! # Códigos de Estado HTTP
//!
//! Este módulo define los códigos de estado HTTP que usará el servidor
//! de archivos. Solo se incluyen los códigos que el servidor realmente
//! produce:
//!
//! - **2xx**: Éxito (200 OK)
//! - **3xx**: Redirección (304 Not Modified para GET condicional)
//! - **4xx**: Error del cliente (400, 403, 404, 408)
//! - **5xx**: Error del servidor (501, 505)

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 304 Not Modified - El archivo no cambió desde If-Modified-Since
    NotModified = 304,

    /// 400 Bad Request - Request malformado
    BadRequest = 400,

    /// 403 Forbidden - Ruta registrada como prohibida
    Forbidden = 403,

    /// 404 Not Found - Archivo inexistente (o ruta oculta)
    NotFound = 404,

    /// 408 Request Timeout - No llegó un request dentro de la ventana de lectura
    RequestTimeout = 408,

    /// 501 Not Implemented - Método HTTP no soportado
    NotImplemented = 501,

    /// 505 HTTP Version Not Supported - Versión distinta de la soportada
    HttpVersionNotSupported = 505,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert!(StatusCode::Ok.is_success());
    /// assert!(!StatusCode::NotFound.is_success());
    /// ```
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Ok)
    }

    /// Verifica si el código indica error del cliente (4xx)
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert!(StatusCode::BadRequest.is_client_error());
    /// assert!(!StatusCode::Ok.is_client_error());
    /// ```
    pub fn is_client_error(&self) -> bool {
        let code = self.as_u16();
        (400..500).contains(&code)
    }

    /// Verifica si el código indica error del servidor (5xx)
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert!(StatusCode::NotImplemented.is_server_error());
    /// assert!(!StatusCode::BadRequest.is_server_error());
    /// ```
    pub fn is_server_error(&self) -> bool {
        let code = self.as_u16();
        (500..600).contains(&code)
    }
}

impl std::fmt::Display for StatusCode {
    /// Formatea el código de estado para mostrarlo
    ///
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
