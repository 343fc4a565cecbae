//! Keyword rule table for offline health replies.
//!
//! Rules are checked in declared order against the lower-cased utterance and
//! the first rule with a matching keyword wins. Order is priority: an
//! utterance mentioning both a headache and a fever gets the headache rule.

/// Greeting that seeds every new transcript.
pub const GREETING: &str = "Hi — I am AudiCare AI Assistant. Ask me about your health concerns, \
symptoms, or general health questions. You can type or use voice input!";

/// One keyword-triggered canned reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Short identifier used in logs.
    pub name: &'static str,
    /// Lower-case substrings; any one of them triggers the rule.
    pub keywords: &'static [&'static str],
    pub response: &'static str,
}

impl Rule {
    /// Whether any keyword occurs in the already lower-cased input.
    pub fn matches(&self, normalized: &str) -> bool {
        self.keywords.iter().any(|k| normalized.contains(k))
    }
}

/// Built-in health rules in priority order.
pub const HEALTH_RULES: [Rule; 11] = [
    Rule {
        name: "headache",
        keywords: &["headache", "head pain"],
        response: "For headaches, try resting in a quiet, dark room. Stay hydrated and consider \
gentle neck stretches. If headaches are severe, frequent, or accompanied by fever, vision \
changes, or neck stiffness, please consult a healthcare provider immediately.",
    },
    Rule {
        name: "fever",
        keywords: &["fever", "temperature"],
        response: "For fever, rest and stay hydrated with water, clear broths, or electrolyte \
drinks. You can use over-the-counter fever reducers as directed. Seek immediate medical \
attention if fever exceeds 103°F (39.4°C), or if you experience difficulty breathing, chest \
pain, or severe symptoms.",
    },
    Rule {
        name: "cough",
        keywords: &["cough", "sore throat"],
        response: "For cough and sore throat, try warm salt water gargles, honey (for ages 1+), \
and staying hydrated. Use a humidifier if possible. See a doctor if symptoms persist over a \
week, you have difficulty swallowing, or experience high fever.",
    },
    Rule {
        name: "stomach",
        keywords: &["stomach", "nausea", "vomit"],
        response: "For stomach issues, try the BRAT diet (bananas, rice, applesauce, toast), \
stay hydrated with small sips of clear fluids. Avoid dairy and fatty foods. Seek medical care \
if you have severe abdominal pain, signs of dehydration, or persistent vomiting.",
    },
    Rule {
        name: "emergency",
        keywords: &["emergency", "urgent", "911"],
        response: "🚨 If this is a medical emergency, please call 911 or go to the nearest \
emergency room immediately. For chest pain, difficulty breathing, severe allergic reactions, or \
loss of consciousness, seek immediate medical attention.",
    },
    Rule {
        name: "medication",
        keywords: &["medication", "medicine", "drug"],
        response: "I can provide general information about health topics, but I cannot \
recommend specific medications or dosages. Please consult with a healthcare provider, \
pharmacist, or your doctor for medication advice tailored to your specific situation.",
    },
    Rule {
        name: "diet",
        keywords: &["diet", "nutrition", "food"],
        response: "A balanced diet includes fruits, vegetables, whole grains, lean proteins, and \
healthy fats. Stay hydrated, limit processed foods and excessive sugar. For personalized \
nutrition advice, consider consulting a registered dietitian.",
    },
    Rule {
        name: "exercise",
        keywords: &["exercise", "workout", "fitness"],
        response: "Regular exercise is great for health! Aim for 150 minutes of moderate aerobic \
activity weekly, plus strength training twice a week. Start slowly if you're new to exercise \
and consult your doctor before beginning any new fitness program.",
    },
    Rule {
        name: "sleep",
        keywords: &["sleep", "insomnia", "tired"],
        response: "Good sleep hygiene includes a consistent sleep schedule, a comfortable sleep \
environment, avoiding screens before bed, and limiting caffeine late in the day. Most adults \
need 7-9 hours of sleep. If sleep problems persist, consider consulting a healthcare provider.",
    },
    Rule {
        name: "stress",
        keywords: &["stress", "anxiety", "mental health"],
        response: "Managing stress is important for overall health. Try deep breathing, \
meditation, regular exercise, and maintaining social connections. If you're experiencing \
persistent anxiety or mental health concerns, please reach out to a mental health professional.",
    },
    Rule {
        name: "doctor",
        keywords: &["doctor", "appointment"],
        response: "It's always good to maintain regular check-ups with your healthcare provider. \
If you have specific health concerns, don't hesitate to schedule an appointment. Many symptoms \
warrant professional medical evaluation.",
    },
];

/// Reply used when no rule matches. Echoes the input as typed.
pub fn generic_reply(input: &str) -> String {
    format!(
        "I understand you're asking about \"{}\". While I can provide general health \
information, I recommend consulting with a healthcare professional for personalized medical \
advice. Is there a specific health topic I can help you learn more about?",
        input
    )
}

/// Ordered, immutable list of rules.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new(HEALTH_RULES.to_vec())
    }
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First rule matching the input, which is lower-cased here.
    pub fn first_match(&self, input: &str) -> Option<&Rule> {
        let normalized = input.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&normalized))
    }
}
