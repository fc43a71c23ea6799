// Code Generation Tests for the VM translator

#[cfg(test)]
mod tests {
    use crate::asm::{render_program, AsmLine};
    use crate::config::TranslatorConfig;
    use crate::error::ToolchainError;
    use crate::vm_translator::codegen::VmCodeGen;
    use crate::vm_translator::context::TranslationContext;
    use crate::vm_translator::parser::parse_source;

    fn quiet_config() -> TranslatorConfig {
        TranslatorConfig {
            bootstrap: false,
            emit_comments: false,
            ..TranslatorConfig::default()
        }
    }

    fn translate(unit: &str, source: &str) -> Result<String, ToolchainError> {
        let config = quiet_config();
        let mut ctx = TranslationContext::new();
        let mut codegen = VmCodeGen::new(&mut ctx, &config);
        codegen.translate_unit(unit, &parse_source(source)?)?;
        Ok(render_program(codegen.lines()))
    }

    fn lines_of(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_push_constant() {
        let out = translate("Main", "push constant 7").unwrap();
        assert_eq!(
            lines_of(&out),
            vec!["@7", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]
        );
    }

    #[test]
    fn test_add_combines_in_place() {
        let out = translate("Main", "add").unwrap();
        assert_eq!(lines_of(&out), vec!["@SP", "AM=M-1", "D=M", "@SP", "A=M-1", "M=D+M"]);
    }

    #[test]
    fn test_sub_is_x_minus_y() {
        let out = translate("Main", "sub").unwrap();
        assert_eq!(lines_of(&out).last(), Some(&"M=M-D"));
    }

    #[test]
    fn test_unary_ops_touch_only_top() {
        let out = translate("Main", "neg\nnot").unwrap();
        assert_eq!(
            lines_of(&out),
            vec!["@SP", "A=M-1", "M=-M", "@SP", "A=M-1", "M=!M"]
        );
    }

    #[test]
    fn test_comparison_labels_are_unique() {
        let out = translate("Main", "eq\neq\nlt\ngt").unwrap();
        assert!(out.contains("(CMP_EQ.1.TRUE)"));
        assert!(out.contains("(CMP_EQ.1.END)"));
        assert!(out.contains("(CMP_EQ.2.TRUE)"));
        assert!(out.contains("(CMP_LT.1.TRUE)"));
        assert!(out.contains("(CMP_GT.1.TRUE)"));
        assert!(out.contains("D;JEQ"));
        assert!(out.contains("D;JLT"));
        assert!(out.contains("D;JGT"));
        assert!(out.contains("M=-1"));
    }

    #[test]
    fn test_segment_addressing() {
        let out = translate("Main", "push local 2").unwrap();
        assert_eq!(
            lines_of(&out)[..5],
            ["@2", "D=A", "@LCL", "A=D+M", "D=M"]
        );

        let out = translate("Main", "push temp 3").unwrap();
        assert_eq!(lines_of(&out)[..2], ["@8", "D=M"]);

        let out = translate("Main", "push pointer 1").unwrap();
        assert_eq!(lines_of(&out)[..2], ["@THAT", "D=M"]);

        let out = translate("Main", "pop static 4").unwrap();
        assert!(out.ends_with("@Main.4\nM=D\n"));
    }

    #[test]
    fn test_pop_through_scratch_register() {
        let out = translate("Main", "pop argument 1").unwrap();
        assert_eq!(
            lines_of(&out),
            vec![
                "@1", "D=A", "@ARG", "D=D+M", "@R13", "M=D", "@SP", "AM=M-1", "D=M", "@R13",
                "A=M", "M=D"
            ]
        );
    }

    #[test]
    fn test_labels_and_branches_are_function_scoped() {
        let source = "function Main.loop 0\nlabel TOP\nif-goto TOP\ngoto TOP\n";
        let out = translate("Main", source).unwrap();
        assert_eq!(
            lines_of(&out),
            vec![
                "(Main.loop)",
                "(Main.loop$TOP)",
                "@SP",
                "AM=M-1",
                "D=M",
                "@Main.loop$TOP",
                "D;JNE",
                "@Main.loop$TOP",
                "0;JMP"
            ]
        );
    }

    #[test]
    fn test_label_outside_function_uses_unit_scope() {
        let out = translate("Prog", "label START").unwrap();
        assert_eq!(out, "(Prog.__toplevel$START)\n");
    }

    #[test]
    fn test_function_zeroes_locals() {
        let out = translate("Main", "function Main.f 2").unwrap();
        let pushes = lines_of(&out).iter().filter(|l| **l == "M=M+1").count();
        assert_eq!(pushes, 2);
        assert!(out.starts_with("(Main.f)\n@0\nD=A\n"));
    }

    #[test]
    fn test_comments_echo_source() {
        let config = TranslatorConfig {
            bootstrap: false,
            ..TranslatorConfig::default()
        };
        let mut ctx = TranslationContext::new();
        let mut codegen = VmCodeGen::new(&mut ctx, &config);
        codegen
            .translate_unit("Main", &parse_source("push constant 1\nadd").unwrap())
            .unwrap();
        let lines = codegen.finish();
        assert_eq!(lines[0], AsmLine::Comment("push constant 1".to_string()));
        assert!(lines.contains(&AsmLine::Comment("add".to_string())));
    }

    #[test]
    fn test_invalid_operands() {
        assert!(matches!(
            translate("Main", "pop constant 3"),
            Err(ToolchainError::UnknownOperand(_, _, Some(1)))
        ));
        assert!(matches!(
            translate("Main", "push temp 8"),
            Err(ToolchainError::UnknownOperand(_, _, Some(1)))
        ));
        assert!(matches!(
            translate("Main", "push pointer 2"),
            Err(ToolchainError::UnknownOperand(_, _, Some(1)))
        ));
        assert!(matches!(
            translate("Main", "\npush heap 0"),
            Err(ToolchainError::UnknownOperand(_, _, Some(2)))
        ));
        assert!(matches!(
            translate("Main", "push constant 40000"),
            Err(ToolchainError::UnknownOperand(_, _, Some(1)))
        ));
        assert!(matches!(
            translate("Main", "push constant -1"),
            Err(ToolchainError::UnknownOperand(_, _, Some(1)))
        ));
        assert!(matches!(
            translate("Main", "push local 40000"),
            Err(ToolchainError::UnknownOperand(_, _, Some(1)))
        ));
        assert!(matches!(
            translate("Main", "push constant 1\npop that 32768"),
            Err(ToolchainError::UnknownOperand(_, _, Some(2)))
        ));
        assert!(translate("Main", "push argument 32767").is_ok());
        assert!(matches!(
            translate("Main", "goto a$b"),
            Err(ToolchainError::UnknownOperand(_, _, Some(1)))
        ));
        assert!(matches!(
            translate("Main", "push local"),
            Err(ToolchainError::MissingOperand(_, Some(1)))
        ));
        assert!(matches!(
            translate("Main", "goto"),
            Err(ToolchainError::MissingOperand(_, Some(1)))
        ));
    }
}
