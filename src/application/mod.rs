// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Each use case wires the lower layers together for one CLI
// command. No tensor math and no printing happen here.
//
//   preprocess  corpus.jsonl → vocab + train/valid examples
//   init        fresh model → checkpoint
//   evaluate    checkpoint + split → teacher-forced accuracy
//   generate    checkpoint + text → keyphrase candidates

pub mod preprocess_use_case;

pub mod init_use_case;

pub mod evaluate_use_case;

pub mod generate_use_case;
