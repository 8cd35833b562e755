use std::fmt;

use crate::cover::state::DurationClass;

/// Narrative role of a beat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BeatKind {
    /// Opening hook.
    Hook,
    /// The owner at work.
    Action,
    /// Delivery and reaction.
    EmotionalPeak,
    /// Reflection after the peak.
    PostPeak,
    /// Call to action.
    Closing,
}

impl BeatKind {
    /// All beats in narrative order.
    pub const ALL: [BeatKind; 5] = [
        BeatKind::Hook,
        BeatKind::Action,
        BeatKind::EmotionalPeak,
        BeatKind::PostPeak,
        BeatKind::Closing,
    ];

    /// Spoken label used in the rendered script.
    pub fn label(self) -> &'static str {
        match self {
            BeatKind::Hook => "HOOK",
            BeatKind::Action => "ACCIÓN",
            BeatKind::EmotionalPeak => "PICO EMOCIONAL",
            BeatKind::PostPeak => "POST-PICO",
            BeatKind::Closing => "CIERRE",
        }
    }
}

/// `(start, end)` seconds of every beat.
pub fn beat_windows(duration: DurationClass) -> [(u32, u32); 5] {
    match duration {
        DurationClass::Short => [(0, 3), (3, 20), (21, 30), (31, 38), (39, 45)],
        DurationClass::Extended => [(0, 3), (3, 40), (41, 70), (71, 100), (101, 120)],
    }
}

/// One timed beat.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Beat {
    /// Role.
    pub kind: BeatKind,
    /// Start second.
    pub start_s: u32,
    /// End second.
    pub end_s: u32,
    /// Narration / direction.
    pub text: String,
}

/// A generated voice-over script.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Script {
    /// Timing template used.
    pub duration: DurationClass,
    /// Beats in order.
    pub beats: Vec<Beat>,
    /// Title of the theme echoed at the end.
    pub theme_title: String,
}

impl Script {
    /// End second of every beat.
    pub fn boundaries(&self) -> Vec<u32> {
        self.beats.iter().map(|b| b.end_s).collect()
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for beat in &self.beats {
            writeln!(
                f,
                "{} ({}–{}s): {}",
                beat.kind.label(),
                beat.start_s,
                beat.end_s,
                beat.text
            )?;
        }
        write!(f, "\n[Temática elegida: {}]", self.theme_title)
    }
}

/// Build the five-beat script. Any input strings are accepted verbatim.
pub fn generate(
    business_name: &str,
    city: &str,
    theme_title: &str,
    duration: DurationClass,
) -> Script {
    let beats = BeatKind::ALL
        .into_iter()
        .zip(beat_windows(duration))
        .map(|(kind, (start_s, end_s))| Beat {
            kind,
            start_s,
            end_s,
            text: beat_text(kind, business_name, city),
        })
        .collect();
    Script {
        duration,
        beats,
        theme_title: theme_title.to_string(),
    }
}

fn beat_text(kind: BeatKind, business_name: &str, city: &str) -> String {
    match kind {
        BeatKind::Hook => format!(
            "Esto pasó HOY en {city} 🔥 Llegamos a {business_name}, un negocio que no se rinde."
        ),
        BeatKind::Action => format!(
            "Mostrar al dueño trabajando (soldadura / esmeril), cortes cada 3s, subtítulos dinámicos: \"{business_name} 🔑 | {city}\"."
        ),
        BeatKind::EmotionalPeak => {
            "Entrega de la app web en el celular, reacción y sonrisa.".to_string()
        }
        BeatKind::PostPeak => {
            "\"Esto… esto es lo que vale la pena. Ver a un ecuatoriano feliz porque alguien creyó en su trabajo.\" (pausa 1–2s).".to_string()
        }
        BeatKind::Closing => {
            "\"Seguimos mañana con otro emprendedor. Si crees en los que trabajan con el corazón, únete a esta comunidad.\"".to_string()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/generator.rs"]
mod tests;
