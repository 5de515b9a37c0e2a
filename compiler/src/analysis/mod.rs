// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

mod liveness;

pub use self::liveness::{
    FlowReport,
    LivenessAnalyzer,
    LivenessLine,
    SuccessorReport,
};
