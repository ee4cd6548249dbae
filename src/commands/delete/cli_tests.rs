//! CLI parsing tests for delete command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "delete",
        test_name: test_delete_requires_table,
        required_arg: "--table",
    }

    crate::cli_option_test! {
        command: "delete",
        variant: Delete,
        test_name: test_delete_with_condition,
        args: ["-t", "users", "-w", "id = 3"],
        field: filter,
        expected: crate::commands::FilterArgs {
            conditions: vec!["id = 3".to_string()],
            ..Default::default()
        },
    }
}
