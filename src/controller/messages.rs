//! User-facing wording for failure paths.
//!
//! Every remote failure kind gets its own sentence so the user can tell
//! "fix the key" from "wait a minute" from "check the network" without
//! reading logs. Recoverable conditions (no speech, empty transcripts)
//! have no wording here on purpose: they are never surfaced.

use crate::capture::CaptureErrorKind;
use crate::remote::RemoteError;

/// Spoken when a matched command's browser action could not be performed.
pub const ACTION_FAILED: &str = "No he podido completar esa acción en el navegador.";

/// Wording for a failed remote completion, by failure kind.
#[must_use]
pub fn remote_failure(error: &RemoteError) -> String {
    match error {
        RemoteError::Unauthorized(_) => {
            "No he podido autenticarme con el asistente remoto. Revisa la clave de API."
                .to_owned()
        }
        RemoteError::RateLimited(_) => {
            "El asistente remoto está recibiendo demasiadas peticiones. Espera un momento y vuelve a intentarlo."
                .to_owned()
        }
        RemoteError::Network(_) => {
            "No he podido conectar con el asistente remoto. Comprueba la conexión a internet."
                .to_owned()
        }
        RemoteError::Malformed(_) | RemoteError::Other(_) => {
            "El asistente remoto ha devuelto una respuesta inesperada. Inténtalo de nuevo."
                .to_owned()
        }
    }
}

/// Wording for a capture error that must be surfaced.
#[must_use]
pub fn capture_failure(kind: &CaptureErrorKind) -> &'static str {
    match kind {
        CaptureErrorKind::PermissionDenied => {
            "Permiso de micrófono denegado. Actívalo en los ajustes para poder escucharte."
        }
        CaptureErrorKind::Unsupported => {
            "El reconocimiento de voz no está disponible en este dispositivo."
        }
        CaptureErrorKind::AudioCapture => "No se pudo capturar audio del micrófono.",
        CaptureErrorKind::Network => "Se perdió la conexión durante el reconocimiento de voz.",
        CaptureErrorKind::NoSpeech | CaptureErrorKind::Unknown(_) => {
            "Ha ocurrido un error con el reconocimiento de voz."
        }
    }
}
