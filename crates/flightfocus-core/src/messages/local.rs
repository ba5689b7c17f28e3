use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::{AttendantMessage, MessageKind, MessageRequest, MessageSource, MessageSourceError};
use crate::session::FlightClass;

struct Entry {
    text: &'static str,
    kind: MessageKind,
}

const fn entry(text: &'static str, kind: MessageKind) -> Entry {
    Entry { text, kind }
}

static TABLE: [Entry; 15] = [
    entry("Great progress! Keep going!", MessageKind::Encouragement),
    entry("You're doing amazing! Stay focused!", MessageKind::Motivation),
    entry("Almost there! Your destination is getting closer!", MessageKind::Progress),
    entry("Excellent focus! The view from up here is beautiful!", MessageKind::Scenery),
    entry("Stay on track! You're flying like a pro!", MessageKind::Encouragement),
    entry("Wonderful concentration! Enjoy your journey!", MessageKind::Motivation),
    entry("Keep it up! We're cruising at the perfect altitude!", MessageKind::Status),
    entry("Fantastic work! The captain is impressed!", MessageKind::Encouragement),
    entry("You're in the zone! Let's reach that destination!", MessageKind::Motivation),
    entry("Perfect flight so far! Maintain that focus!", MessageKind::Encouragement),
    entry("We're passing over beautiful landscapes below. Stay focused!", MessageKind::Scenery),
    entry("Your focus is inspiring other passengers!", MessageKind::Encouragement),
    entry("Smooth flying conditions ahead. Keep up the great work!", MessageKind::Status),
    entry("You're making excellent time to your destination!", MessageKind::Progress),
    entry("The captain has turned off the seatbelt sign. Stay focused!", MessageKind::Status),
];

static BUSINESS_EXTRAS: [Entry; 2] = [
    entry("Enjoy your premium Business class experience!", MessageKind::Business),
    entry("Your lie-flat seat is perfect for deep focus work!", MessageKind::Business),
];

/// Table-backed message source with a seedable RNG.
pub struct LocalMessageSource {
    rng: Mcg128Xsl64,
}

impl LocalMessageSource {
    pub fn new() -> Self {
        Self {
            rng: Mcg128Xsl64::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
        }
    }

    /// Messages eligible at `progress` for `class`, before the random pick.
    fn candidates(progress: f64, class: FlightClass) -> Vec<&'static Entry> {
        let stage: fn(&Entry) -> bool = if progress > 0.8 {
            |e| e.kind == MessageKind::Progress || e.text.contains("Almost") || e.text.contains("destination")
        } else if progress > 0.5 {
            |e| matches!(e.kind, MessageKind::Encouragement | MessageKind::Scenery)
        } else {
            |e| matches!(e.kind, MessageKind::Motivation | MessageKind::Status)
        };

        let mut pool: Vec<&'static Entry> = TABLE.iter().filter(|e| stage(*e)).collect();
        if class == FlightClass::Business {
            pool.extend(BUSINESS_EXTRAS.iter());
        }
        pool
    }
}

impl Default for LocalMessageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSource for LocalMessageSource {
    fn next_message(&mut self, request: &MessageRequest) -> Result<AttendantMessage, MessageSourceError> {
        let pool = Self::candidates(request.progress, request.flight_class);
        let picked = pool.choose(&mut self.rng).ok_or(MessageSourceError::Empty)?;
        Ok(AttendantMessage {
            message: picked.text.to_string(),
            kind: picked.kind,
            timestamp: request.at,
            flight_progress: request.progress,
        })
    }
}

/// Route details for the contextual message variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightContext {
    pub progress: f64,
    pub flight_class: FlightClass,
    pub departure_label: String,
    pub arrival_label: String,
    pub duration_minutes: u32,
}

/// One sentence about this specific route, picked by progress.
pub fn contextual_message(ctx: &FlightContext, request: &MessageRequest) -> AttendantMessage {
    let (from, to) = (&ctx.departure_label, &ctx.arrival_label);
    let message = if ctx.progress > 0.9 {
        format!("Excellent work! You're almost at {to}. Prepare for landing!")
    } else if ctx.progress > 0.5 {
        format!("Halfway there! The view between {from} and {to} is spectacular!")
    } else if ctx.duration_minutes > 60 {
        format!("This is a long-haul flight to {to}. Stay hydrated and keep focusing!")
    } else {
        format!("Great progress on your flight from {from} to {to}!")
    };

    AttendantMessage {
        message,
        kind: MessageKind::Contextual,
        timestamp: request.at,
        flight_progress: ctx.progress,
    }
}
