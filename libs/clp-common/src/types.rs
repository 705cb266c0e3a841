use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages accepted by the remote execution service.
///
/// Wire names and version indexes are fixed by the execution service;
/// they are not configurable per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python3,
    Java,
    Cpp,
    C,
    Nodejs,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Python3,
        Language::Java,
        Language::Cpp,
        Language::C,
        Language::Nodejs,
    ];

    /// Runtime version index expected by the execution service.
    pub fn version_index(&self) -> &'static str {
        match self {
            Language::Python3 => "3",
            Language::Java => "4",
            Language::Cpp => "6",
            Language::C => "6",
            Language::Nodejs => "4",
        }
    }

    /// Name used on the wire and in CLI arguments.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Language::Python3 => "python3",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Nodejs => "nodejs",
        }
    }

    /// Hello-world scaffold offered when the caller has no source file yet.
    pub fn starter_code(&self) -> &'static str {
        match self {
            Language::Python3 => "print(\"Hello, World!\")\n",
            Language::Java => {
                "public class Main {\n  public static void main(String[] args) {\n    System.out.println(\"Hello, World!\");\n  }\n}\n"
            }
            Language::Cpp => {
                "#include <iostream>\nusing namespace std;\n\nint main() {\n  cout << \"Hello, World!\" << endl;\n  return 0;\n}\n"
            }
            Language::C => {
                "#include <stdio.h>\n\nint main() {\n  printf(\"Hello, World!\\n\");\n  return 0;\n}\n"
            }
            Language::Nodejs => "console.log(\"Hello, World!\");\n",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python3" | "python" => Ok(Language::Python3),
            "java" => Ok(Language::Java),
            "cpp" => Ok(Language::Cpp),
            "c" => Ok(Language::C),
            "nodejs" | "javascript" => Ok(Language::Nodejs),
            other => Err(format!(
                "unknown language '{}', valid options: python3, java, cpp, c, nodejs",
                other
            )),
        }
    }
}

/// Platform roles. The backend issues role-specific tokens and every
/// protected route family belongs to exactly one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    /// First URL segment of this role's route family.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    /// Landing route a logged-in user of this role is sent to.
    pub fn home_route(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/home",
            Role::Teacher => "/teacher/home",
            Role::Student => "/student/home",
        }
    }

    /// Login screen for this role's route family.
    pub fn login_route(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/login",
            Role::Teacher => "/teacher/login",
            Role::Student => "/student/login",
        }
    }

    /// Map a URL path segment back to a role, if it names one.
    pub fn from_path_segment(segment: &str) -> Option<Role> {
        match segment {
            "admin" => Some(Role::Admin),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_path_segment(&s.to_lowercase())
            .ok_or_else(|| format!("unknown role '{}', valid options: admin, teacher, student", s))
    }
}

/// One test case of a coding question. Immutable, owned by the question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input_data: String,
    pub expected_output: String,
    #[serde(default)]
    pub hidden: bool,
}

/// A coding question as served by the platform backend. Read-only from
/// the evaluator's perspective; fetched once per submission session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sample_input: String,
    #[serde(default)]
    pub sample_output: String,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

/// Per-test-case grading result. Transient; produced for display only,
/// never persisted. Hidden cases are flagged but still fully computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    pub input: String,
    pub expected: String,
    pub actual: String,
    pub is_correct: bool,
    pub hidden: bool,
}

/// Final submission record sent to the platform backend once per
/// evaluation run.
///
/// Invariants: `score == passed_test_cases * 10` and
/// `correct == (passed_test_cases == total_test_cases)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub question_id: u64,
    pub code: String,
    pub total_test_cases: u32,
    pub passed_test_cases: u32,
    pub score: u32,
    pub correct: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_wire_names() {
        assert_eq!(
            serde_json::to_string(&Language::Python3).unwrap(),
            r#""python3""#
        );
        assert_eq!(
            serde_json::to_string(&Language::Nodejs).unwrap(),
            r#""nodejs""#
        );
        let lang: Language = serde_json::from_str(r#""cpp""#).unwrap();
        assert_eq!(lang, Language::Cpp);
    }

    #[test]
    fn test_language_version_index_table() {
        assert_eq!(Language::Python3.version_index(), "3");
        assert_eq!(Language::Java.version_index(), "4");
        assert_eq!(Language::Cpp.version_index(), "6");
        assert_eq!(Language::C.version_index(), "6");
        assert_eq!(Language::Nodejs.version_index(), "4");
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("python3".parse::<Language>().unwrap(), Language::Python3);
        assert_eq!("JAVA".parse::<Language>().unwrap(), Language::Java);
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), r#""STUDENT""#);
        let role: Role = serde_json::from_str(r#""ADMIN""#).unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_role_routes() {
        assert_eq!(Role::Teacher.home_route(), "/teacher/home");
        assert_eq!(Role::Admin.login_route(), "/admin/login");
        assert_eq!(Role::from_path_segment("student"), Some(Role::Student));
        assert_eq!(Role::from_path_segment("courses"), None);
    }

    #[test]
    fn test_question_wire_format() {
        let json = r#"{
            "id": 7,
            "title": "Sum of Two Numbers",
            "description": "Read two integers and print their sum.",
            "sampleInput": "1 2",
            "sampleOutput": "3",
            "testCases": [
                {"inputData": "1 2", "expectedOutput": "3", "hidden": false},
                {"inputData": "10 20", "expectedOutput": "30", "hidden": true}
            ]
        }"#;

        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.id, 7);
        assert_eq!(q.test_cases.len(), 2);
        assert_eq!(q.test_cases[0].input_data, "1 2");
        assert!(q.test_cases[1].hidden);
    }

    #[test]
    fn test_question_defaults() {
        // Backend may omit optional fields entirely
        let q: Question = serde_json::from_str(r#"{"id": 1, "title": "t"}"#).unwrap();
        assert!(q.test_cases.is_empty());
        assert_eq!(q.sample_input, "");
    }

    #[test]
    fn test_submission_outcome_wire_format() {
        let outcome = SubmissionOutcome {
            question_id: 7,
            code: "print(1)".to_string(),
            total_test_cases: 3,
            passed_test_cases: 2,
            score: 20,
            correct: false,
        };

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains(r#""questionId":7"#));
        assert!(json.contains(r#""totalTestCases":3"#));
        assert!(json.contains(r#""passedTestCases":2"#));
        assert!(json.contains(r#""score":20"#));
        assert!(json.contains(r#""correct":false"#));
    }

    #[test]
    fn test_test_case_result_wire_format() {
        let result = TestCaseResult {
            input: "1 2".to_string(),
            expected: "3".to_string(),
            actual: "4".to_string(),
            is_correct: false,
            hidden: true,
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""isCorrect":false"#));
        assert!(json.contains(r#""hidden":true"#));
    }
}
