// Prompt constants for the LLM analyzer.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for resume/JD match analysis.
pub const ANALYZE_SYSTEM: &str = "You are an expert technical recruiter who evaluates how well \
    a candidate's resume matches a job description. Be objective and specific.";

/// Analysis prompt. Replace `{resume}` and `{job_description}` before sending.
pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"Compare the resume with the job description and score the match.

Return a JSON object with this EXACT schema (no extra fields):
{
  "matchScore": 75,
  "strengths": ["5+ years of React experience", "Led a team of four engineers"],
  "gaps": ["No Docker experience mentioned"],
  "overallAssessment": "Good match for this role. ..."
}

SCORING RUBRIC (matchScore is an integer from 0 to 100):
- Required technical skills present in the resume: 60%
- Years of experience against the stated requirement: 30%
- Education against the stated requirement: 10%

Rules:
- strengths: at most 6 short phrases, each backed by the resume text.
- gaps: at most 5 short phrases naming requirements the resume does not show.
- overallAssessment: two or three sentences with a hiring recommendation.

RESUME:
{resume}

JOB DESCRIPTION:
{job_description}"#;

/// System prompt for structured resume extraction.
pub const EXTRACT_SYSTEM: &str =
    "You are an expert resume parser. Extract structured facts from a resume.";

/// Extraction prompt. Replace `{resume}` before sending.
pub const EXTRACT_PROMPT_TEMPLATE: &str = r#"Extract the key information from the resume below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "skills": ["React", "Node.js"],
  "experience": ["Senior Software Engineer at Acme (2019 - present)"],
  "education": ["Bachelor of Science in Computer Science"],
  "summary": "One sentence describing the candidate."
}

Rules:
- skills: at most 15 technologies or competencies named in the resume.
- experience: job titles with employer, most recent first.
- education: one entry per degree or certification.

RESUME:
{resume}"#;
