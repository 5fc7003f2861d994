//! Assistant persona used as the system message for generated answers.

use crate::domain::{AcademicYear, QuestionText};

/// Institutional context presented to the answer generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantPersona {
    pub institution: String,
    pub specialisms: Vec<String>,
    pub courses: Vec<String>,
    pub head_of_department: String,
    pub lab_hours: String,
    pub contact: String,
}

impl Default for AssistantPersona {
    fn default() -> Self {
        Self {
            institution: "Osun State University".to_owned(),
            specialisms: vec![
                "Programming (Python/Java/C++)".to_owned(),
                "Algorithms".to_owned(),
                "Data Structures".to_owned(),
            ],
            courses: [
                "CSC101", "CSC201", "MTH101", "MTH102", "PHY101", "PHY102", "CHM101", "CHM102",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            head_of_department: "Dr. Jimoh".to_owned(),
            lab_hours: "Mon/Wed 10am-4pm".to_owned(),
            contact: "csdept@uniosun.edu.ng".to_owned(),
        }
    }
}

impl AssistantPersona {
    /// Render the system message.
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!(
            "You are a {} Computer Science assistant. Specialise in:\n",
            self.institution
        );
        for specialism in &self.specialisms {
            prompt.push_str("- ");
            prompt.push_str(specialism);
            prompt.push('\n');
        }
        if !self.courses.is_empty() {
            prompt.push_str("- Courses like ");
            prompt.push_str(&self.courses.join(", "));
            prompt.push('\n');
        }
        prompt.push_str("\nDepartment Info:\n");
        prompt.push_str(&format!("- HOD: {}\n", self.head_of_department));
        prompt.push_str(&format!("- Lab: {}\n", self.lab_hours));
        prompt.push_str(&format!("- Contact: {}", self.contact));
        prompt
    }

    /// Render the user message for a student's question.
    pub fn user_prompt(year: AcademicYear, question: &QuestionText) -> String {
        format!("CS Student ({year} year) asks: {question}")
    }
}
