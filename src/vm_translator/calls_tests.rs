// Calling convention tests

#[cfg(test)]
mod tests {
    use crate::asm::render_program;
    use crate::config::TranslatorConfig;
    use crate::error::ToolchainError;
    use crate::vm_translator::{SourceUnit, VmTranslator};
    use test_log::test;

    fn translator(bootstrap: bool) -> VmTranslator {
        VmTranslator::new(TranslatorConfig {
            bootstrap,
            emit_comments: false,
            ..TranslatorConfig::default()
        })
    }

    fn unit(name: &str, source: &str) -> SourceUnit {
        SourceUnit::parse(name, source).unwrap()
    }

    #[test]
    fn test_bootstrap_sets_sp_and_calls_entry() {
        let text = translator(true).translate_to_text(&[]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[..4], ["@256", "D=A", "@SP", "M=D"]);
        assert!(text.contains("@Sys.init\n0;JMP\n"));
        // Bootstrap runs before any unit is entered
        assert!(text.contains("(__toplevel$$ret.1)"));
    }

    #[test]
    fn test_bootstrap_honors_config() {
        let config = TranslatorConfig {
            entry_function: "Main.main".to_string(),
            stack_base: 300,
            emit_comments: false,
            ..TranslatorConfig::default()
        };
        let text = VmTranslator::new(config).translate_to_text(&[]).unwrap();
        assert!(text.starts_with("@300\nD=A\n@SP\nM=D\n"));
        assert!(text.contains("@Main.main\n0;JMP\n"));
    }

    #[test]
    fn test_call_frame_layout() {
        let text = translator(false)
            .translate_to_text(&[unit("Main", "function Main.main 0\ncall Math.max 2\n")])
            .unwrap();
        let lines: Vec<&str> = text.lines().collect();
        let call_start = 1;
        assert_eq!(
            lines[call_start..call_start + 3],
            ["@Main.main$$ret.1", "D=A", "@SP"]
        );
        for base in ["@LCL", "@ARG", "@THIS", "@THAT"] {
            assert!(lines.contains(&base), "{} never saved", base);
        }
        // ARG = SP - 5 - 2
        assert!(text.contains("@SP\nD=M\n@LCL\nM=D\n@7\nD=D-A\n@ARG\nM=D\n"));
        assert!(text.ends_with("@Math.max\n0;JMP\n(Main.main$$ret.1)\n"));
    }

    #[test]
    fn test_return_labels_unique_across_units() {
        let units = [
            unit("A", "function A.f 0\ncall B.g 0\ncall B.g 0\nreturn\n"),
            unit("B", "function B.g 0\ncall A.f 1\nreturn\n"),
        ];
        let text = translator(true).translate_to_text(&units).unwrap();
        for label in [
            "(__toplevel$$ret.1)",
            "(A.f$$ret.2)",
            "(A.f$$ret.3)",
            "(B.g$$ret.4)",
        ] {
            assert_eq!(text.matches(label).count(), 1, "{}", label);
        }
    }

    #[test]
    fn test_return_unwinds_frame() {
        let lines = translator(false)
            .translate_program(&[unit("Main", "function Main.f 0\nreturn\n")])
            .unwrap();
        let text = render_program(&lines);
        // Return address is read before argument 0 is overwritten
        let ret_read = text.find("@R15\nM=D").unwrap();
        let arg_write = text.find("@ARG\nA=M\nM=D").unwrap();
        assert!(ret_read < arg_write);
        assert!(text.contains("@ARG\nD=M+1\n@SP\nM=D\n"));
        for (depth, base) in [(1, "THAT"), (2, "THIS"), (3, "ARG"), (4, "LCL")] {
            let restore = format!("@R14\nD=M\n@{}\nA=D-A\nD=M\n@{}\nM=D\n", depth, base);
            assert!(text.contains(&restore), "{} not restored", base);
        }
        assert!(text.ends_with("@R15\nA=M\n0;JMP\n"));
    }

    #[test]
    fn test_return_resets_scope() {
        let text = translator(false)
            .translate_to_text(&[unit(
                "Main",
                "function Main.f 0\nreturn\nlabel AFTER\n",
            )])
            .unwrap();
        assert!(text.contains("(Main.__toplevel$AFTER)"));
    }

    #[test]
    fn test_builds_share_nothing() {
        let t = translator(false);
        let units = [unit("Main", "eq\nfunction Main.f 0\ncall Main.f 0\n")];
        let first = t.translate_to_text(&units).unwrap();
        let second = t.translate_to_text(&units).unwrap();
        assert_eq!(first, second);
        assert!(second.contains("(CMP_EQ.1.TRUE)"));
        assert!(second.contains("(Main.f$$ret.1)"));
    }

    #[test]
    fn test_vm_label_shaped_like_return_label_assembles() {
        let source = "\
            function Main.f 0\n\
            label ret.1\n\
            call Main.g 0\n\
            goto ret.1\n\
            function Main.g 0\n\
            push constant 0\n\
            return\n";
        let lines = translator(false)
            .translate_program(&[unit("Main", source)])
            .unwrap();
        let text = render_program(&lines);
        assert!(text.contains("(Main.f$ret.1)"));
        assert!(text.contains("(Main.f$$ret.1)"));

        let program = crate::assembler::Assembler::new()
            .assemble_lines(&lines)
            .unwrap();
        assert_ne!(
            program.symbol_address("Main.f$ret.1"),
            program.symbol_address("Main.f$$ret.1")
        );
    }

    #[test]
    fn test_vm_label_with_dollar_rejected() {
        let result = translator(false)
            .translate_program(&[unit("Main", "function Main.f 0\nlabel $ret.1\n")]);
        assert!(matches!(
            result,
            Err(ToolchainError::UnknownOperand(_, _, Some(2)))
        ));
    }

    #[test]
    fn test_duplicate_unit_rejected() {
        let units = [unit("Main", "push constant 1"), unit("Main", "push constant 2")];
        assert_eq!(
            translator(false).translate_program(&units),
            Err(ToolchainError::UnitNameCollision("Main".to_string()))
        );
    }

    #[test]
    fn test_oversized_argument_count() {
        let result = translator(false)
            .translate_program(&[unit("Main", "function Main.f 0\ncall Main.g 32765\n")]);
        assert!(matches!(result, Err(ToolchainError::ResourceExhaustion(_))));
    }
}
