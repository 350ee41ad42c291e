// All LLM prompt templates for the tailoring pipeline.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Role line shared by the scoring prompt.
pub const ATS_SCORE_SYSTEM: &str =
    "You are an Applicant Tracking System (ATS) analyst. You compare resumes \
    against job requirements the way automated resume filters do.";

/// Job structuring prompt. Replace: {json_only}, {jd_text}
pub const JOB_EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract structured information from this job description. Return JSON with this format:
{
  "title": "job title",
  "company": "company name",
  "location": "location",
  "requirements": ["requirement 1", "requirement 2"],
  "skills": ["skill 1", "skill 2"]
}

{json_only}

Job Description:
{jd_text}"#;

/// Resume tailoring prompt.
/// Replace: {no_fabrication}, {json_only}, {job_title}, {company}, {skills},
///          {name}, {summary}, {resume_skills}, {experience}
pub const TAILOR_PROMPT_TEMPLATE: &str = r#"You are an expert resume optimizer. Tailor this resume for this specific job.

Job Title: {job_title}
Company: {company}
Required Skills: {skills}

Original Resume:
Name: {name}
Summary: {summary}
Skills: {resume_skills}

Experience:
{experience}

Provide a tailored summary and rewritten experience descriptions that:
1. Highlight relevant skills matching the job
2. Use keywords from the job description
3. Emphasize achievements matching job requirements
4. Optimize for ATS (use standard formatting, keywords naturally)

{no_fabrication}

Return JSON with this format:
{
  "tailoredSummary": "tailored 2-3 sentence summary",
  "tailoredExperience": [
    {"originalTitle": "Original Job Title", "newDescription": ["tailored bullet 1", "tailored bullet 2"]}
  ],
  "keywordMatches": ["matching skill 1", "matching skill 2"]
}

"originalTitle" MUST repeat the job title exactly as written above.

{json_only}"#;

/// ATS scoring prompt. Replace: {system}, {resume_text}, {requirements}, {skills}
pub const ATS_SCORE_PROMPT_TEMPLATE: &str = r#"{system}

Analyze this resume against a job description for ATS (Applicant Tracking System) compatibility.

Resume: {resume_text}

Job Requirements: {requirements}
Required Skills: {skills}

Provide a JSON response with:
{
  "score": number (0-100),
  "matchPercentage": number (0-100),
  "matchedKeywords": ["keyword1", "keyword2"],
  "missingKeywords": ["keyword1", "keyword2"],
  "improvements": ["improvement 1", "improvement 2"]
}"#;

/// Free-text profile analysis. Replace: {name}, {email}, {summary}, {skills},
/// {experience}, {education}
pub const PROFILE_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze this resume and provide a concise summary of key strengths and areas:

Contact: {name} - {email}
Summary: {summary}
Skills: {skills}

Experience:
{experience}

Education:
{education}

Provide a 2-3 sentence analysis of this candidate's profile."#;
