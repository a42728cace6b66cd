use std::fs;

use coursefind_core::error::Error;
use coursefind_trends::{
    analyze_learning_methods, analyze_roles, available_years, language_trends, summarize_roles, SurveyLoader,
};

const HEADER: &str = "ResponseId,MainBranch,LanguageHaveWorkedWith,LanguageWantToWorkWith,DevType,LearnCode,LearnCodeOnline";

fn write_surveys(dir: &std::path::Path) {
    fs::write(
        dir.join("survey_results_public_2024.csv"),
        format!(
            "{HEADER}\n\
             1,Dev,Python;JavaScript,Rust;Python,\"Developer, back-end\",Books;Online Courses,Videos\n\
             2,Dev,JavaScript,TypeScript,\"Developer, front-end\",NA,Videos;Blogs\n\
             3,Dev,Python,NA,Data scientist,School,NA\n"
        ),
    )
    .unwrap();
    fs::write(
        dir.join("survey_results_public_2023.csv"),
        format!("{HEADER}\n1,Dev,Java,Kotlin,Developer,Books,Videos\n"),
    )
    .unwrap();
    // lacks LearnCodeOnline
    fs::write(
        dir.join("survey_results_public_2022.csv"),
        "ResponseId,LanguageHaveWorkedWith,LanguageWantToWorkWith,DevType,LearnCode\n1,C,C,Dev,Books\n",
    )
    .unwrap();
    fs::write(dir.join("survey_results_schema_2024.csv"), "qname,question\n").unwrap();
    fs::write(dir.join("README.txt"), "not a survey").unwrap();
}

#[test]
fn load_dir_discovers_years_and_skips_incomplete_exports() {
    let dir = tempfile::tempdir().unwrap();
    write_surveys(dir.path());
    let data = SurveyLoader::new().load_dir(dir.path()).unwrap();
    assert_eq!(available_years(&data), vec![2023, 2024]);
    assert_eq!(data.len(), 4);
    assert_eq!(data.responses()[0].year, 2023);
}

#[test]
fn trend_tables_for_a_year() {
    let dir = tempfile::tempdir().unwrap();
    write_surveys(dir.path());
    let data = SurveyLoader::new().load_dir(dir.path()).unwrap();

    let langs = language_trends(&data, 2024);
    let table: Vec<(&str, i64)> = langs.rows().iter().map(|t| (t.language.as_str(), t.growth)).collect();
    assert_eq!(
        table,
        vec![("Rust", 1), ("TypeScript", 1), ("Python", -1), ("JavaScript", -2)]
    );
    assert_eq!(langs.rising(2).len(), 2);
    assert_eq!(langs.declining(1)[0].language, "JavaScript");

    let roles = analyze_roles(&data, 2024);
    // respondent 3 has no wanted languages
    assert!(roles.iter().all(|r| r.role != "Data scientist"));
    assert_eq!(roles[0].role, "Developer, back-end");
    let summary = summarize_roles(&roles, 3);
    assert_eq!(summary.len(), 2);
    assert!(summary.iter().all(|s| s.avg_positive_growth >= 0.0 && s.avg_negative_growth <= 0.0));

    let learning = analyze_learning_methods(&data, 2024);
    assert_eq!(learning[0].method, "Videos");
    assert_eq!((learning[0].offline, learning[0].online, learning[0].total), (0, 2, 2));
    assert_eq!(learning.len(), 5);
}

#[test]
fn missing_directory_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = SurveyLoader::new().load_dir(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))));
}
