use crate::features::completion::CompletionDictionary;

pub(crate) const SAMPLE_DOCUMENT: &str = "# MInDes sample input
Solver.Loop.begin_step = 0
Solver.Loop.end_step = 1000
Solver.Mesh.Nx = 64

Preprocess.Phi.geometry_structure.box = (0,0,0),(32,32,32)
";

pub(crate) const SAMPLE_DICTIONARY: &str = r#"{
    "": ["Solver", "Preprocess", "Postprocess"],
    "Solver": ["Loop", "Mesh", "Output"],
    "Solver.Loop": ["begin_step", "end_step", "dt"]
}"#;

pub(crate) fn sample_dictionary() -> CompletionDictionary {
    CompletionDictionary::from_json(SAMPLE_DICTIONARY).expect("failed to parse sample dictionary")
}
