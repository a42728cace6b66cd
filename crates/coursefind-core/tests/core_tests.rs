use std::fs;
use std::io::Write;
use tempfile::TempDir;

use coursefind_core::course_loader::CourseLoader;
use coursefind_core::error::Error;

const HEADER: &str = "Course_Name,Platform,Skills,Level,Rating,Number of students,Url";

#[test]
fn load_small_csv() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("courses.csv");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "{HEADER}").unwrap();
    writeln!(f, "Intro to Python,Coursera,\"Python, Basics\",0,4.5,1000,https://x").unwrap();
    writeln!(f, "Python Ninja,Udemy,\"python, advanced\",2,4.8,200.0,https://y").unwrap();

    let courses = CourseLoader::new().load(&path).expect("load");

    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0].name, "Intro to Python");
    assert_eq!(courses[0].skills.as_deref(), Some("Python, Basics"));
    assert_eq!(courses[0].normalized_skills(), "python basics");
    assert_eq!(courses[1].num_students, 200, "integral floats are accepted");
    assert_eq!(courses[1].level, 2);
}

#[test]
fn empty_skills_become_missing() {
    let csv = format!("{HEADER}\nMystery,edX,,1,3.0,5,u\n");
    let courses = CourseLoader::new().load_reader(csv.as_bytes()).expect("load");
    assert_eq!(courses[0].skills, None);
    assert_eq!(courses[0].normalized_skills(), "nan");
}

#[test]
fn missing_column_is_reported() {
    let csv = "Course_Name,Platform,Level,Rating,Number of students\nA,B,0,4.0,1\n";
    let err = CourseLoader::new().load_reader(csv.as_bytes()).unwrap_err();
    match err.downcast_ref::<Error>() {
        Some(Error::MissingColumn { column, available }) => {
            assert_eq!(column, "Skills");
            assert!(available.contains(&"Platform".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn malformed_row_aborts() {
    let csv = format!("{HEADER}\nA,B,x,zero,4.0,1,u\n");
    let err = CourseLoader::new().load_reader(csv.as_bytes()).unwrap_err();
    assert!(format!("{err:#}").contains("line 2"), "{err:#}");
}

#[test]
fn missing_file_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = CourseLoader::new().load(&tmp.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))));
}
