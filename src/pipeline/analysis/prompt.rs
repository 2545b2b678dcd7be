use crate::models::Language;

const ENGLISH_INSTRUCTION_PREAMBLE: &str = "\
Act as a medical AI assistant providing preliminary health insights. The user is describing \
their symptoms, and you need to provide a compassionate analysis of possible conditions, do's \
and don'ts, natural remedies, and recommendations. Remember to include a disclaimer that this \
is not professional medical advice.";

const ENGLISH_INSTRUCTION_SECTIONS: &str = "\
Please structure your response with the following sections:
1. Brief analysis of the symptoms
2. Possible conditions (with estimated likelihood percentages)
3. A list of do's (supportive actions)
4. A list of don'ts (things to avoid)
5. Natural remedies that might help
6. Professional recommendations (e.g., which type of doctor to see)
7. A medical disclaimer

Provide thoughtful, helpful information while emphasizing the importance of professional \
medical advice for accurate diagnosis.";

const TAMIL_INSTRUCTION_PREAMBLE: &str = "\
ஒரு மருத்துவ AI உதவியாளராக செயல்படுங்கள், முதன்மை சுகாதார நுண்ணறிவுகளை வழங்குகிறது. பயனர் \
தங்கள் அறிகுறிகளை விவரிக்கிறார், மற்றும் நீங்கள் இரக்கமான பகுப்பாய்வை வழங்க வேண்டும் சாத்தியமான \
நிலைமைகள், செய்யவேண்டியவை மற்றும் செய்யக்கூடாதவை, இயற்கை தீர்வுகள், மற்றும் பரிந்துரைகள். இது \
தொழில்முறை மருத்துவ ஆலோசனை அல்ல என்பதை நினைவில் கொள்ளுங்கள்.";

const TAMIL_INSTRUCTION_SECTIONS: &str = "\
தயவுசெய்து உங்கள் பதிலை பின்வரும் பிரிவுகளுடன் கட்டமைக்கவும்:
1. அறிகுறிகளின் சுருக்கமான பகுப்பாய்வு
2. சாத்தியமான நிலைமைகள் (மதிப்பிடப்பட்ட வாய்ப்பு சதவீதத்துடன்)
3. செய்யவேண்டியவை பட்டியல் (ஆதரவு செயல்கள்)
4. செய்யக்கூடாதவை பட்டியல் (தவிர்க்க வேண்டிய விஷயங்கள்)
5. உதவக்கூடிய இயற்கை தீர்வுகள்
6. தொழில்முறை பரிந்துரைகள் (எ.கா., எந்த வகையான மருத்துவரை பார்க்க வேண்டும்)
7. ஒரு மருத்துவ மறுப்பு

துல்லியமான நோயறியலுக்கு தொழில்முறை மருத்துவ ஆலோசனையின் முக்கியத்துவத்தை வலியுறுத்தும் \
அதேவேளையில் சிந்தனையுள்ள, பயனுள்ள தகவல்களை வழங்கவும்.";

pub const ENGLISH_CHAT_SYSTEM_PROMPT: &str = "\
You are a medical AI assistant providing preliminary health insights. Structure your responses \
with: 1) Brief analysis, 2) Possible conditions with percentages, 3) Do's list, 4) Don'ts list, \
5) Natural remedies, 6) Professional recommendations, 7) Medical disclaimer.";

pub const TAMIL_CHAT_SYSTEM_PROMPT: &str = "\
நீங்கள் முதன்மை சுகாதார பார்வைகளை வழங்கும் ஒரு மருத்துவ AI உதவியாளர். உங்கள் பதில்களை இவ்வாறு \
அமைக்கவும்: 1) சுருக்கமான பகுப்பாய்வு, 2) சாத்தியமான நிலைமைகள் சதவீதங்களுடன், 3) செய்யவேண்டியவை \
பட்டியல், 4) செய்யக்கூடாதவை பட்டியல், 5) இயற்கை தீர்வுகள், 6) தொழில்முறை பரிந்துரைகள், 7) மருத்துவ \
மறுப்பு.";

/// Language-specific prompt in both envelope shapes.
///
/// `instruction` is a single `[INST]` block for text-generation endpoints;
/// `system` and `user` form the message pair for chat endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt {
    pub language: Language,
    pub instruction: String,
    pub system: String,
    pub user: String,
}

impl AnalysisPrompt {
    pub fn build(symptoms: &str, language: Language) -> Self {
        Self {
            language,
            instruction: build_instruction_prompt(symptoms, language),
            system: chat_system_prompt(language).to_string(),
            user: build_chat_user_message(symptoms, language),
        }
    }
}

/// Build the `<s>[INST] ... [/INST]</s>` prompt embedding the symptoms.
pub fn build_instruction_prompt(symptoms: &str, language: Language) -> String {
    let (preamble, symptoms_label, sections) = match language {
        Language::English => (
            ENGLISH_INSTRUCTION_PREAMBLE,
            "User symptoms",
            ENGLISH_INSTRUCTION_SECTIONS,
        ),
        Language::Tamil => (
            TAMIL_INSTRUCTION_PREAMBLE,
            "பயனரின் அறிகுறிகள்",
            TAMIL_INSTRUCTION_SECTIONS,
        ),
    };

    format!("<s>[INST] {preamble}\n\n{symptoms_label}: {symptoms}\n\n{sections} [/INST]</s>")
}

pub fn chat_system_prompt(language: Language) -> &'static str {
    match language {
        Language::English => ENGLISH_CHAT_SYSTEM_PROMPT,
        Language::Tamil => TAMIL_CHAT_SYSTEM_PROMPT,
    }
}

pub fn build_chat_user_message(symptoms: &str, language: Language) -> String {
    match language {
        Language::English => format!("Please analyze these symptoms: {symptoms}"),
        Language::Tamil => format!("தயவுசெய்து இந்த அறிகுறிகளை ஆராய்க: {symptoms}"),
    }
}
