//! Ordered keyword rules mapping free text to a reply topic.
//!
//! Rules are evaluated top to bottom and the first match wins. Several
//! keyword sets overlap ("prueba de color" vs "color", "consulta" vs
//! anything else), so the order of `default_rules()` is part of the
//! behavior and must not be rearranged.

use tracing::debug;

/// A canned-reply topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    HairConsultation,
    WashAndGo,
    ElaborateCurls,
    BoxBraids,
    CrochetMethod,
    ColorTest,
    ColorGeneral,
    Pricing,
    Hours,
    Services,
    Location,
    Booking,
    Greeting,
    Thanks,
}

impl Topic {
    /// Every topic, in rule order.
    pub const ALL: [Topic; 14] = [
        Topic::HairConsultation,
        Topic::WashAndGo,
        Topic::ElaborateCurls,
        Topic::BoxBraids,
        Topic::CrochetMethod,
        Topic::ColorTest,
        Topic::ColorGeneral,
        Topic::Pricing,
        Topic::Hours,
        Topic::Services,
        Topic::Location,
        Topic::Booking,
        Topic::Greeting,
        Topic::Thanks,
    ];

    /// File in the content store holding this topic's reply.
    pub fn content_file(self) -> &'static str {
        match self {
            Topic::HairConsultation => "consulta_capilar.txt",
            Topic::WashAndGo => "lavado_rizos.txt",
            Topic::ElaborateCurls => "rizos_elaborados.txt",
            Topic::BoxBraids => "trenzas_africanas.txt",
            Topic::CrochetMethod => "metodo_crochet.txt",
            Topic::ColorTest => "prueba_color.txt",
            Topic::ColorGeneral => "color_hint.txt",
            Topic::Pricing => "costos.txt",
            Topic::Hours => "horario.txt",
            Topic::Services => "servicios.txt",
            Topic::Location => "ubicacion.txt",
            Topic::Booking => "reserva.txt",
            Topic::Greeting => "hola.txt",
            Topic::Thanks => "gracias.txt",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Topic::HairConsultation => "hair-consultation",
            Topic::WashAndGo => "wash-and-go",
            Topic::ElaborateCurls => "elaborate-curls",
            Topic::BoxBraids => "box-braids",
            Topic::CrochetMethod => "crochet-method",
            Topic::ColorTest => "color-test",
            Topic::ColorGeneral => "color-general",
            Topic::Pricing => "pricing",
            Topic::Hours => "hours",
            Topic::Services => "services",
            Topic::Location => "location",
            Topic::Booking => "booking",
            Topic::Greeting => "greeting",
            Topic::Thanks => "thanks",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A substring test against normalized text.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// The phrase appears anywhere.
    Phrase(&'static str),
    /// Every word appears, in any order.
    AllOf(&'static [&'static str]),
}

impl Trigger {
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Trigger::Phrase(p) => normalized.contains(p),
            Trigger::AllOf(words) => words.iter().all(|w| normalized.contains(w)),
        }
    }
}

/// One row of the rule table: any trigger selects the topic.
#[derive(Debug, Clone)]
pub struct ResponseRule {
    pub topic: Topic,
    pub triggers: Vec<Trigger>,
}

impl ResponseRule {
    fn phrases(topic: Topic, phrases: &[&'static str]) -> Self {
        Self {
            topic,
            triggers: phrases.iter().copied().map(Trigger::Phrase).collect(),
        }
    }

    pub fn matches(&self, normalized: &str) -> bool {
        self.triggers.iter().any(|t| t.matches(normalized))
    }
}

/// Case-fold and trim.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().trim().to_string()
}

/// Ordered keyword rule table.
#[derive(Debug, Clone)]
pub struct ResponseRules {
    rules: Vec<ResponseRule>,
}

impl ResponseRules {
    /// The salon's rule table, in precedence order.
    pub fn default_rules() -> Self {
        use Topic::*;

        let mut color_test = ResponseRule::phrases(ColorTest, &["prueba de color", "prueba color"]);
        color_test.triggers.push(Trigger::AllOf(&["prueba", "color"]));

        let rules = vec![
            ResponseRule::phrases(
                HairConsultation,
                &["consulta capilar", "consulta", "relajacion", "relajación"],
            ),
            ResponseRule::phrases(
                WashAndGo,
                &["wash and go", "lavado", "definicion de rizos", "definición de rizos"],
            ),
            ResponseRule::phrases(ElaborateCurls, &["rizos elaborados", "elaborados", "flexis"]),
            ResponseRule::phrases(
                BoxBraids,
                &["trenzas", "boxbraids", "box braids", "africanas"],
            ),
            ResponseRule::phrases(CrochetMethod, &["crochet", "metodo crochet", "método crochet"]),
            color_test,
            ResponseRule::phrases(ColorGeneral, &["color", "tinte"]),
            ResponseRule::phrases(Pricing, &["costos"]),
            ResponseRule::phrases(Hours, &["horario"]),
            ResponseRule::phrases(Services, &["servicios"]),
            ResponseRule::phrases(Location, &["ubicacion", "ubicación"]),
            ResponseRule::phrases(Booking, &["reserva"]),
            ResponseRule::phrases(Greeting, &["hola"]),
            ResponseRule::phrases(Thanks, &["gracias"]),
        ];

        Self { rules }
    }

    pub fn rules(&self) -> &[ResponseRule] {
        &self.rules
    }

    /// First matching topic for `text`, or `None` when nothing matches.
    pub fn evaluate(&self, text: &str) -> Option<Topic> {
        let normalized = normalize(text);
        let topic = self
            .rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.topic);

        debug!(topic = ?topic, "Keyword rules evaluated");
        topic
    }
}

impl Default for ResponseRules {
    fn default() -> Self {
        Self::default_rules()
    }
}
