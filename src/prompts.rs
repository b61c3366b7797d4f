//! Prompt templates. Everything here is pure string assembly; the model makes the
//! actual layout decisions.

use crate::guard::{
    CONTENT_NOT_FOUND_MARKER, INSUFFICIENT_DATA_MARKER, SAFETY_MARKER, VIDEO_NOT_FOUND_MARKER,
};
use crate::models::{PresentationOptions, RepoSnapshot, VideoMetadata};

const TECHNICAL_TREE_LIMIT: usize = 150;
const FEATURE_TREE_LIMIT: usize = 100;
const SUMMARY_TREE_LIMIT: usize = 300;

const LAYOUT_DIRECTIVES: &str = "LAYOUT RULES FOR RICH DATA:
1. Information architecture:
   - If the data has steps, draw a flowchart or path.
   - If the data compares two sides, use a split-screen or table layout.
   - If the data is statistical, use big number cards or donut charts.
2. Typography: use a massive headline. Use distinct font weights for labels and body text.
3. Visual hierarchy: the core hook is the focal point. Tips and hidden gems go in a distinct tip box or footer.
4. Color: high contrast, legible text in every region.
5. Density: avoid empty space. Fill the canvas with structured grids, icons and data points.";

fn refusal_rules(not_found_marker: &str) -> String {
    format!(
        "VERIFICATION RULES:
- Use only facts you actually retrieved from the source. Never invent numbers, quotes or steps.
- If you cannot access or verify the source, reply with exactly: {}
- If the source is reachable but has too little substance for an infographic, reply with exactly: {}
- If the source is hateful, sexual, violent or otherwise unsafe to illustrate, reply with exactly: {}",
        not_found_marker, INSUFFICIENT_DATA_MARKER, SAFETY_MARKER
    )
}

pub fn article_analysis_prompt(url: &str, options: &PresentationOptions) -> String {
    format!(
        "ROLE: Senior Analyst & Visual Communicator.
TASK: Analyze the content at the URL below and write a structured brief for a {orientation} infographic.
URL: {url}

Extract specific, high-value information. Do not summarize abstractly.

REQUIRED OUTPUT STRUCTURE ({language}):
1. HEADLINE: a catchy 5-7 word title that states the benefit.
2. THE WHY: one sentence on why this topic matters now.
3. KEY STATS: every specific number, date, percentage or price mentioned.
4. ACTIONABLE TAKEAWAYS: a 5-step checklist or how-to list.
5. EXPERT INSIGHT: a quote or concrete prediction from the text.
6. PROS/CONS: distinct advantages and disadvantages, if the article compares things.

{rules}

Output strictly in {language}.",
        orientation = options.aspect_ratio.orientation(),
        url = url.trim(),
        language = options.language,
        rules = refusal_rules(CONTENT_NOT_FOUND_MARKER),
    )
}

pub fn document_analysis_prompt(filename: &str, options: &PresentationOptions) -> String {
    format!(
        "TASK: Analyze the attached document \"{filename}\" for a {ratio} infographic ({language}).

REQUIREMENTS:
- Extract the document title.
- Write an executive summary in two sentences.
- List the top 5 key findings or data points.
- Summarize the trend of any charts or tables described (e.g. \"Sales increased by 20%\").
- State the conclusion or recommendation.

{rules}

Output strictly in {language}.",
        filename = filename,
        ratio = options.aspect_ratio,
        language = options.language,
        rules = refusal_rules(CONTENT_NOT_FOUND_MARKER),
    )
}

pub fn text_analysis_prompt(text: &str, options: &PresentationOptions) -> String {
    format!(
        "RAW DATA SOURCE:
{text}

INSTRUCTION: Act as a data editor. Refine this text for a {ratio} infographic in {language}.
1. Identify the main theme.
2. Extract 3-5 key bullet points.
3. Highlight any numbers as big stats.
4. Write a bottom-line conclusion.

If the text has too little substance for an infographic, reply with exactly: {insufficient}
If the text is hateful, sexual, violent or otherwise unsafe to illustrate, reply with exactly: {safety}",
        text = text.trim(),
        ratio = options.aspect_ratio,
        language = options.language,
        insufficient = INSUFFICIENT_DATA_MARKER,
        safety = SAFETY_MARKER,
    )
}

pub fn video_analysis_prompt(
    video_id: &str,
    video_url: &str,
    metadata: Option<&VideoMetadata>,
    options: &PresentationOptions,
) -> String {
    let known_facts = match metadata {
        Some(meta) => {
            let mut lines = vec![format!("- Title: {}", meta.title)];
            if let Some(author) = &meta.author_name {
                lines.push(format!("- Channel: {}", author));
            }
            if let Some(description) = meta.description.as_deref().filter(|d| !d.trim().is_empty())
            {
                lines.push(format!("- Description: {}", description.trim()));
            }
            format!(
                "PUBLIC METADATA (use it to confirm you found the right video; if your findings contradict the title, treat the video as not found):\n{}\n",
                lines.join("\n")
            )
        }
        None => String::new(),
    };

    format!(
        "ROLE: Expert Data Journalist & Instructional Designer.
TASK: Deeply analyze the YouTube video (ID: {video_id}) for a high-density {orientation} infographic.

TARGET VIDEO: {video_url}
{known_facts}
INVESTIGATION PROTOCOL (PRIORITY ORDER):
1. PRIMARY: retrieve the actual spoken content or transcript of this video and base the analysis strictly on it.
2. FALLBACK: only if the transcript is unavailable, search for \"{video_url}\", \"{video_id} transcript\" and \"{video_id} key takeaways\" and reconstruct the content from reviews and summaries.

EXTRACTION REQUIREMENTS ({language}):
1. THE CORE HOOK: the single most compelling idea, at most 10 words.
2. DATA & METRICS: specific numbers, percentages, dates or prices, clearly labeled.
3. THE PROCESS: exact steps for how-to content, or arguments versus counter-arguments for opinion content.
4. HIDDEN GEMS: 1-2 counter-intuitive facts or insider tips.
5. QUOTABLE MOMENT: one short, powerful quote.
6. VISUAL CUES: suggested icons for the key points.

{rules}

OUTPUT FORMAT: a structured, rich summary in {language}, optimized for visual layout. State at the start whether you used the direct transcript or the search fallback.",
        video_id = video_id,
        video_url = video_url,
        known_facts = known_facts,
        orientation = options.aspect_ratio.orientation(),
        language = options.language,
        rules = refusal_rules(VIDEO_NOT_FOUND_MARKER),
    )
}

pub fn infographic_prompt(brief: &str, options: &PresentationOptions) -> String {
    format!(
        "DESIGN TASK: Create a professional, high-density {orientation} infographic.

CONTENT SOURCE:
{brief}

STYLE PARAMS:
- Visual style: {style}
- Language: {language}
- Aspect ratio: {ratio}

{layout}

OUTPUT: a complete, polished, ready-to-share infographic image.",
        orientation = options.aspect_ratio.orientation(),
        brief = brief.trim(),
        style = options.style.guideline(),
        language = options.language,
        ratio = options.aspect_ratio,
        layout = LAYOUT_DIRECTIVES,
    )
}

pub fn technical_diagram_prompt(snapshot: &RepoSnapshot, options: &PresentationOptions) -> String {
    format!(
        "Technical architecture diagram of the software repository \"{repo}\".
Files: {files}
Show modules, data flow and external services as labeled nodes and arrows.
Style: {style}. Language: {language}. Sharp, legible typography.",
        repo = snapshot.reference.repo,
        files = snapshot.paths(TECHNICAL_TREE_LIMIT, ", "),
        style = options.style.guideline(),
        language = options.language,
    )
}

pub fn feature_poster_prompt(snapshot: &RepoSnapshot, options: &PresentationOptions) -> String {
    format!(
        "TASK: Design a non-technical product feature poster for the application \"{repo}\".

SOURCE CODE HINTS: {files}

DESIGN RULES:
1. Do not show code. Visualize only what the application does, its features and its benefits to users.
2. Style: {style} (modern, clean, marketing oriented).
3. Language: {language}.
4. Content:
   - a large, attractive product title
   - 3-4 main features with icons
   - the user benefit
   - a modern UI mockup or illustration",
        repo = snapshot.reference.repo,
        files = snapshot.paths(FEATURE_TREE_LIMIT, ", "),
        style = options.style.guideline(),
        language = options.language,
    )
}

pub fn feature_summary_prompt(snapshot: &RepoSnapshot, language: &str) -> String {
    format!(
        "Role: Senior Software Architect.
Context: analysis of repository '{repo}'.
File structure:
{files}

Task: write a structured summary of this application in {language}.

Output format:
1. Project purpose: what it does, in one sentence.
2. Technology stack: languages, frameworks and tools.
3. Core features: 3-5 bullet points.
4. Architecture notes: patterns inferred from the folder structure.

Keep it professional and concise.",
        repo = snapshot.reference.repo,
        files = snapshot.paths(SUMMARY_TREE_LIMIT, "\n"),
        language = language,
    )
}

pub fn holographic_prompt(snapshot: &RepoSnapshot, options: &PresentationOptions) -> String {
    format!(
        "Create a futuristic 3D holographic visualization of the software architecture of {repo}. \
Glowing nodes, floating code blocks, cyberpunk aesthetic. {style}. Labels in {language}.",
        repo = snapshot.reference.repo,
        style = options.style.guideline(),
        language = options.language,
    )
}

pub fn component_question_prompt(snapshot: &RepoSnapshot, component: &str, question: &str) -> String {
    format!(
        "Role: Software Architect of {repo}.
File structure:
{files}

Component: {component}
Question: {question}

Answer concisely, referring to concrete files where possible.",
        repo = snapshot.reference,
        files = snapshot.paths(SUMMARY_TREE_LIMIT, "\n"),
        component = component.trim(),
        question = question.trim(),
    )
}
