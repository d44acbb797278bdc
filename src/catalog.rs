// Copyright 2025 Cowboy AI, LLC.

//! Builtin algorithm catalog
//!
//! The schemas below cover the surface the composer is exercised against:
//! plain learners, ensemble containers with a trailing wrapped-learner slot,
//! a support-vector machine with kernel and calibrator slots, kernels,
//! filters including the list-valued multi-filter, and neighbour search
//! providers for the lazy learner.

use crate::schema::{AlgorithmSchema, Category, OptionSpec, SlotSpec};

/// Class identifier of the majority-class baseline learner
pub const ZERO_RULE: &str = "learn.rule.ZeroRule";

/// Class identifier of the default boosting base learner
pub const STUMP: &str = "learn.tree.Stump";

fn rules() -> Vec<AlgorithmSchema> {
    vec![
        AlgorithmSchema::new(ZERO_RULE, Category::Learner, "Majority-class baseline learner"),
        AlgorithmSchema::new("learn.rule.OneRule", Category::Learner, "Single-attribute rule learner")
            .with_option(OptionSpec::scalar("B", "Minimum bucket size", "6")),
        AlgorithmSchema::new("learn.rule.Ripper", Category::Learner, "Incremental pruning rule learner")
            .with_option(OptionSpec::scalar("F", "Number of folds for pruning", "3"))
            .with_option(OptionSpec::scalar("N", "Minimum total instance weight", "2.0"))
            .with_option(OptionSpec::scalar("O", "Number of optimization runs", "2"))
            .with_option(OptionSpec::scalar("S", "Random seed", "1")),
    ]
}

fn trees() -> Vec<AlgorithmSchema> {
    vec![
        AlgorithmSchema::new(STUMP, Category::Learner, "One-level decision tree"),
        AlgorithmSchema::new("learn.tree.Cart", Category::Learner, "Pruned decision tree learner")
            .with_option(OptionSpec::scalar("C", "Pruning confidence", "0.25"))
            .with_option(OptionSpec::scalar("M", "Minimum instances per leaf", "2"))
            .with_option(OptionSpec::flag("U", "Use unpruned tree")),
        AlgorithmSchema::new("learn.tree.RepTree", Category::Learner, "Reduced-error pruning tree")
            .with_option(OptionSpec::scalar("M", "Minimum instances per leaf", "2"))
            .with_option(OptionSpec::scalar("V", "Minimum variance proportion", "0.001"))
            .with_option(OptionSpec::scalar("N", "Number of pruning folds", "3"))
            .with_option(OptionSpec::scalar("S", "Random seed", "1"))
            .with_option(OptionSpec::scalar("L", "Maximum tree depth", "-1"))
            .with_option(OptionSpec::scalar("I", "Initial instance weight", "0.0")),
        AlgorithmSchema::new("learn.tree.RandomTree", Category::Learner, "Randomized tree learner")
            .with_option(OptionSpec::scalar("K", "Attributes considered per split", "0"))
            .with_option(OptionSpec::scalar("M", "Minimum instance weight per leaf", "1.0"))
            .with_option(OptionSpec::scalar("S", "Random seed", "1")),
        AlgorithmSchema::new("learn.tree.Hoeffding", Category::Learner, "Incremental Hoeffding tree")
            .with_option(OptionSpec::scalar("G", "Grace period", "200.0"))
            .with_option(OptionSpec::scalar("T", "Split confidence threshold", "0.05")),
    ]
}

fn bayes_and_lazy() -> Vec<AlgorithmSchema> {
    vec![
        AlgorithmSchema::new("learn.bayes.NaiveBayes", Category::Learner, "Naive Bayes learner")
            .with_option(OptionSpec::flag("K", "Use kernel density estimator"))
            .with_option(OptionSpec::flag("D", "Discretize numeric attributes")),
        AlgorithmSchema::new("learn.lazy.Knn", Category::Learner, "K-nearest-neighbour learner")
            .with_option(OptionSpec::scalar("K", "Number of neighbours", "1"))
            .with_option(OptionSpec::flag("X", "Select K by cross-validation"))
            .with_slot(SlotSpec::quoted_single(
                "S",
                "Neighbour search provider",
                Category::Search,
                "search.Linear",
            )),
    ]
}

fn functions() -> Vec<AlgorithmSchema> {
    vec![
        AlgorithmSchema::new("learn.fn.Logistic", Category::Learner, "Ridge logistic regression")
            .with_option(OptionSpec::scalar("R", "Ridge value", "1.0E-8"))
            .with_option(OptionSpec::scalar("M", "Maximum iterations", "-1")),
        AlgorithmSchema::new("learn.fn.Perceptron", Category::Learner, "Multilayer perceptron")
            .with_option(OptionSpec::scalar("L", "Learning rate", "0.3"))
            .with_option(OptionSpec::scalar("M", "Momentum", "0.2"))
            .with_option(OptionSpec::scalar("N", "Training epochs", "500"))
            .with_option(OptionSpec::scalar("H", "Hidden layer spec", "a")),
        AlgorithmSchema::new("learn.fn.Svm", Category::Learner, "Support-vector machine")
            .with_option(OptionSpec::scalar("C", "Complexity constant", "1.0"))
            .with_option(OptionSpec::scalar("T", "Tolerance", "0.001"))
            .with_slot(SlotSpec::quoted_single(
                "K",
                "Kernel function",
                Category::Kernel,
                "kernel.Poly",
            ))
            .with_slot(SlotSpec::quoted_single(
                "A",
                "Probability calibrator",
                Category::Learner,
                "learn.fn.Logistic",
            )),
    ]
}

fn meta() -> Vec<AlgorithmSchema> {
    vec![
        AlgorithmSchema::new("learn.meta.Boosting", Category::Learner, "Adaptive boosting ensemble")
            .with_option(OptionSpec::scalar("P", "Weight mass percentage", "100"))
            .with_option(OptionSpec::scalar("S", "Random seed", "1"))
            .with_option(OptionSpec::scalar("I", "Number of iterations", "10"))
            .with_option(OptionSpec::flag("Q", "Use resampling instead of reweighting"))
            .with_slot(SlotSpec::trailing("W", "Wrapped base learner", Category::Learner, STUMP)),
        AlgorithmSchema::new("learn.meta.Bagging", Category::Learner, "Bootstrap aggregating ensemble")
            .with_option(OptionSpec::scalar("P", "Bag size percentage", "100"))
            .with_option(OptionSpec::scalar("S", "Random seed", "1"))
            .with_option(OptionSpec::scalar("I", "Number of iterations", "10"))
            .with_slot(SlotSpec::trailing(
                "W",
                "Wrapped base learner",
                Category::Learner,
                "learn.tree.RepTree",
            )),
        AlgorithmSchema::new("learn.meta.RandomForest", Category::Learner, "Random forest ensemble")
            .with_option(OptionSpec::scalar("I", "Number of trees", "100"))
            .with_option(OptionSpec::scalar("K", "Attributes considered per split", "0"))
            .with_option(OptionSpec::scalar("S", "Random seed", "1")),
        AlgorithmSchema::new(
            "learn.meta.FilteredLearner",
            Category::Learner,
            "Learner over filtered data",
        )
        .with_slot(SlotSpec::quoted_single(
            "F",
            "Data filter",
            Category::Filter,
            "filter.Normalize",
        ))
        .with_slot(SlotSpec::trailing("W", "Wrapped base learner", Category::Learner, ZERO_RULE)),
    ]
}

fn kernels() -> Vec<AlgorithmSchema> {
    vec![
        AlgorithmSchema::new("kernel.Poly", Category::Kernel, "Polynomial kernel")
            .with_option(OptionSpec::scalar("E", "Exponent", "1.0"))
            .with_option(OptionSpec::scalar("C", "Cache size", "250007")),
        AlgorithmSchema::new("kernel.Rbf", Category::Kernel, "Radial basis function kernel")
            .with_option(OptionSpec::scalar("G", "Gamma", "0.01"))
            .with_option(OptionSpec::scalar("C", "Cache size", "250007")),
        AlgorithmSchema::new("kernel.Text", Category::Kernel, "Subsequence text kernel")
            .with_option(OptionSpec::scalar("M", "Maximum subsequence length", "3"))
            .with_option(OptionSpec::scalar("L", "Decay factor", "0.5")),
    ]
}

fn filters() -> Vec<AlgorithmSchema> {
    vec![
        AlgorithmSchema::new("filter.Normalize", Category::Filter, "Rescale numeric attributes")
            .with_option(OptionSpec::scalar("S", "Scale", "1.0"))
            .with_option(OptionSpec::scalar("T", "Translation", "0.0")),
        AlgorithmSchema::new(
            "filter.ReplaceMissing",
            Category::Filter,
            "Replace missing values with means and modes",
        ),
        AlgorithmSchema::new("filter.RemoveUseless", Category::Filter, "Drop near-constant attributes")
            .with_option(OptionSpec::scalar("M", "Maximum variance percentage", "99.0")),
        AlgorithmSchema::new("filter.Multi", Category::Filter, "Apply filters in sequence")
            .with_slot(SlotSpec::quoted_list("F", "Filters to apply", Category::Filter)),
    ]
}

fn search() -> Vec<AlgorithmSchema> {
    vec![
        AlgorithmSchema::new("search.Linear", Category::Search, "Brute-force neighbour search"),
        AlgorithmSchema::new("search.KdTree", Category::Search, "KD-tree neighbour search")
            .with_option(OptionSpec::scalar("L", "Maximum leaf size", "40")),
        AlgorithmSchema::new("search.Cover", Category::Search, "Cover-tree neighbour search")
            .with_option(OptionSpec::scalar("B", "Expansion base", "1.3")),
    ]
}

/// All builtin schemas, in registration order
pub fn builtin_schemas() -> Vec<AlgorithmSchema> {
    let mut schemas = Vec::new();
    schemas.extend(rules());
    schemas.extend(trees());
    schemas.extend(bayes_and_lazy());
    schemas.extend(functions());
    schemas.extend(meta());
    schemas.extend(kernels());
    schemas.extend(filters());
    schemas.extend(search());
    schemas
}
