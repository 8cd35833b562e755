use std::str::FromStr;

use crate::foundation::error::{PortadaError, PortadaResult};

/// A canned headline/subhead pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    /// Headline text.
    pub title: &'static str,
    /// Subhead text.
    pub subtitle: &'static str,
}

/// Key into the fixed theme table.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ThemeKey {
    /// "We gave it a giant push".
    #[default]
    Regalo,
    /// Arrived when it was most needed.
    Rescate,
    /// Before/after in 24 hours.
    AntesDespues,
    /// Local origin story.
    Historia,
    /// 24-hour challenge.
    Reto24h,
    /// From trade to brand.
    Transformacion,
    /// Losing customers.
    DolorVentas,
    /// The trick nobody told you.
    Truco,
    /// What we did for $0.
    Precio,
    /// First customer testimonial.
    Testimonio,
    /// The #1 business mistake.
    Error,
    /// Community effort.
    Comunidad,
    /// Behind the scenes.
    Backstage,
    /// Dreams built by working.
    Sueno,
}

impl ThemeKey {
    /// Every theme, in table order.
    pub const ALL: [ThemeKey; 14] = [
        ThemeKey::Regalo,
        ThemeKey::Rescate,
        ThemeKey::AntesDespues,
        ThemeKey::Historia,
        ThemeKey::Reto24h,
        ThemeKey::Transformacion,
        ThemeKey::DolorVentas,
        ThemeKey::Truco,
        ThemeKey::Precio,
        ThemeKey::Testimonio,
        ThemeKey::Error,
        ThemeKey::Comunidad,
        ThemeKey::Backstage,
        ThemeKey::Sueno,
    ];

    /// Serialized key (`"antesDespues"`, `"reto24h"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeKey::Regalo => "regalo",
            ThemeKey::Rescate => "rescate",
            ThemeKey::AntesDespues => "antesDespues",
            ThemeKey::Historia => "historia",
            ThemeKey::Reto24h => "reto24h",
            ThemeKey::Transformacion => "transformacion",
            ThemeKey::DolorVentas => "dolorVentas",
            ThemeKey::Truco => "truco",
            ThemeKey::Precio => "precio",
            ThemeKey::Testimonio => "testimonio",
            ThemeKey::Error => "error",
            ThemeKey::Comunidad => "comunidad",
            ThemeKey::Backstage => "backstage",
            ThemeKey::Sueno => "sueno",
        }
    }

    /// Table entry for this key.
    pub fn theme(self) -> Theme {
        let (title, subtitle) = match self {
            ThemeKey::Regalo => (
                "LE DIMOS UN IMPULSO GIGANTE 🚀",
                "Su negocio hoy luce diferente",
            ),
            ThemeKey::Rescate => (
                "LLEGAMOS CUANDO MÁS LO NECESITABA",
                "Mira cómo lo resolvimos en minutos",
            ),
            ThemeKey::AntesDespues => ("ASÍ CAMBIÓ EN 24 HORAS", "Del taller al mundo digital"),
            ThemeKey::Historia => (
                "DE SHUSHUFINDI PARA EL MUNDO 🌎",
                "Un ecuatoriano que no se rinde",
            ),
            ThemeKey::Reto24h => (
                "24 HORAS PARA HACERLO POSIBLE",
                "¿Lo logramos? Mira el final",
            ),
            ThemeKey::Transformacion => (
                "DE OFICIO A MARCA",
                "La diferencia está en cómo te ven",
            ),
            ThemeKey::DolorVentas => ("ESTABA PERDIENDO CLIENTES 😢", "Hasta que hicimos esto…"),
            ThemeKey::Truco => (
                "EL TRUCO QUE NADIE TE CONTÓ",
                "Así te encuentran más rápido",
            ),
            ThemeKey::Precio => ("LO QUE HICIMOS POR $0", "Y el cambio fue brutal"),
            ThemeKey::Testimonio => ("LO QUE DIJO SU PRIMER CLIENTE", "Te vas a sorprender"),
            ThemeKey::Error => ("EL ERROR #1 DE LOS NEGOCIOS", "Y cómo lo corregimos hoy"),
            ThemeKey::Comunidad => (
                "ESTO LO HICIMOS ENTRE TODOS",
                "Gracias por apoyar a los que luchan",
            ),
            ThemeKey::Backstage => (
                "ASÍ SE VIVE CUANDO AYUDAMOS",
                "Momentos reales, cero guion",
            ),
            ThemeKey::Sueno => (
                "SUEÑOS QUE SE CONSTRUYEN TRABAJANDO",
                "Hoy dimos un paso más",
            ),
        };
        Theme { title, subtitle }
    }
}

impl FromStr for ThemeKey {
    type Err = PortadaError;

    fn from_str(s: &str) -> PortadaResult<Self> {
        let s = s.trim();
        ThemeKey::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PortadaError::validation(format!("unknown theme '{s}'")))
    }
}

impl std::fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cover/theme.rs"]
mod tests;
