//! Fixed prompt text used by every model call

/// Opening questions asked in every interview, in presentation order
pub const STATIC_QUESTIONS: [&str; 7] = [
    "Can you describe the general layout of your organization's IT infrastructure and key technologies currently in use?",
    "How are your current technologies integrated, and are there any legacy systems in use? How do these systems coexist and communicate?",
    "What strategies do you employ for data management and security, and how do you handle data compliance?",
    "How does your organization approach and adapt to new technological changes or trends?",
    "What are the most significant IT challenges your organization faces, and how are you addressing them?",
    "How does your IT strategy align with your overall business objectives?",
    "What does your future technology roadmap look like, and what key upgrades or changes are you planning?",
];

/// System role for question generation and synthesis
pub const DISCOVERY_SYSTEM_ROLE: &str = "You are an expert technical discovery assistant helping IT professionals gather information about client systems.";

/// System role for folding answers into documentation statements
pub const WRITER_SYSTEM_ROLE: &str =
    "You are an expert technical writer creating documentation from interview notes.";

const QUESTIONS_INSTRUCTION: &str = "Generate exactly 7 targeted technical discovery questions based on this information, focusing on system architecture, data security, and technology management. Ensure each question is concise, specific, and requires only a single-part answer. Format each question on a new line with a question mark at the end:";

const SUMMARY_INSTRUCTION: &str = "Provide a concise technical summary of the following information, highlighting key system architectures, technological integrations, and any potential areas of improvement:";

const NEXT_STEPS_INSTRUCTION: &str = "Outline the next steps a Systems Engineer should take considering the current technical infrastructure, focusing on areas like system upgrades, integration challenges, and potential technological advancements:";

pub fn rephrase_prompt(question: &str, answer: &str) -> String {
    format!(
        "Rephrase this Question and Answer into a coherent statement for technical documentation. Do not add any commentary. Question: {} Answer: {}",
        question, answer
    )
}

pub fn questions_prompt(context: &str) -> String {
    format!("{}\n\n{}", QUESTIONS_INSTRUCTION, context)
}

pub fn summary_prompt(context: &str) -> String {
    format!("{}\n\n{}", SUMMARY_INSTRUCTION, context)
}

pub fn next_steps_prompt(context: &str) -> String {
    format!("{}\n\n{}", NEXT_STEPS_INSTRUCTION, context)
}
