// Fixed vocabularies for the rule-based analyzer.
// All entries are lowercase; callers match them against lowercased text.

/// Technology terms recognised as skills, in reporting order.
pub const SKILL_VOCABULARY: &[&str] = &[
    "react",
    "angular",
    "vue",
    "node.js",
    "nodejs",
    "express",
    "python",
    "java",
    "javascript",
    "typescript",
    "html",
    "css",
    "sql",
    "mongodb",
    "postgresql",
    "mysql",
    "aws",
    "azure",
    "gcp",
    "docker",
    "kubernetes",
    "k8s",
    "redis",
    "graphql",
    "rest",
    "api",
    "microservices",
    "git",
    "ci/cd",
    "jenkins",
    "terraform",
    "ansible",
    "linux",
    "agile",
    "scrum",
    "jira",
    "redux",
    "next.js",
    "nestjs",
    "spring",
    "django",
    "flask",
    "fastapi",
    ".net",
    "c++",
    "go",
    "rust",
    "php",
    "ruby",
    "rails",
    "laravel",
    "elasticsearch",
];

/// A job description mentioning any of these is treated as requiring a degree.
pub const JD_EDUCATION_KEYWORDS: &[&str] = &["degree", "bachelor", "education", "university"];

/// A resume mentioning any of these satisfies a degree requirement.
pub const RESUME_DEGREE_KEYWORDS: &[&str] = &["bachelor", "master", "degree", "university", "college"];

/// Resume mentions that earn the degree strength.
pub const DEGREE_STRENGTH_KEYWORDS: &[&str] = &["bachelor", "degree"];

pub const COMPUTER_SCIENCE_KEYWORDS: &[&str] = &["computer science", "cs "];

pub const SENIORITY_KEYWORDS: &[&str] = &["lead", "senior"];

pub const DESIGN_KEYWORDS: &[&str] = &["architect", "design"];

/// True when `text` (already lowercased) contains any of `keywords`.
pub fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}
