use serde::{Deserialize, Serialize};

/// Languages with a dedicated chat persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    Chinese,
    English,
    Spanish,
    French,
    German,
    Japanese,
    Korean,
    Russian,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::Chinese,
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Japanese,
        Language::Korean,
        Language::Russian,
    ];

    /// Fallback for unknown or missing languages.
    pub const DEFAULT: Language = Language::Chinese;

    pub fn name(self) -> &'static str {
        match self {
            Self::Chinese => "Chinese",
            Self::English => "English",
            Self::Spanish => "Spanish",
            Self::French => "French",
            Self::German => "German",
            Self::Japanese => "Japanese",
            Self::Korean => "Korean",
            Self::Russian => "Russian",
        }
    }

    /// Lookup by exact English name ("English", not "english").
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.name() == name)
    }

    /// Known language, or [`Language::DEFAULT`].
    pub fn resolve(name: Option<&str>) -> Self {
        name.and_then(Self::from_name).unwrap_or(Self::DEFAULT)
    }

    pub fn chat_prompt(self) -> &'static str {
        match self {
            Self::Chinese => "你是一个友好、专业的AI助手。请始终使用简体中文回答用户的问题，回答要准确、清晰、有帮助。",
            Self::English => "You are a friendly and knowledgeable AI assistant. Always reply in English with accurate, clear and helpful answers.",
            Self::Spanish => "Eres un asistente de IA amable y experto. Responde siempre en español con respuestas precisas, claras y útiles.",
            Self::French => "Tu es un assistant IA aimable et compétent. Réponds toujours en français avec des réponses précises, claires et utiles.",
            Self::German => "Du bist ein freundlicher und kompetenter KI-Assistent. Antworte immer auf Deutsch, präzise, klar und hilfreich.",
            Self::Japanese => "あなたは親切で知識豊富なAIアシスタントです。常に日本語で、正確で分かりやすく役に立つ回答をしてください。",
            Self::Korean => "당신은 친절하고 박식한 AI 어시스턴트입니다. 항상 한국어로 정확하고 명확하며 도움이 되는 답변을 해 주세요.",
            Self::Russian => "Ты дружелюбный и знающий ИИ-ассистент. Всегда отвечай на русском языке точно, понятно и по существу.",
        }
    }
}

/// System prompt for document translation into `target_language`.
pub fn translation_prompt(target_language: &str) -> String {
    format!(
        "You are a professional translator. Translate the text provided by the user into {target_language}. \
         Preserve the meaning, tone and paragraph structure of the original. \
         Return only the translated text without explanations or notes."
    )
}
