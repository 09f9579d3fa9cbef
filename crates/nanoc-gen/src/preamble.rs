/// The fixed header emitted once per output, before any user function.
///
/// Declares the opaque `FILE` type and the three standard streams, the
/// `%d\n` format constant, the C library externs the emitted IR calls
/// into, and a built-in one-argument `print` that wraps `printf`.
pub const PREAMBLE: &str = r#"%FILE = type opaque
@__stdinp  = external global %FILE*, align 8
@__stdoutp = external global %FILE*, align 8
@__stderrp = external global %FILE*, align 8
@str = private unnamed_addr constant [4 x i8] c"%d\0A\00", align 1
declare i32 @fprintf(%FILE*, i8*, ...)
declare i32 @printf(i8*, ...)
declare i32 @atoi(...)
define i32 @print(i32) nounwind {
  call i32 (i8*, ...) @printf(i8* getelementptr inbounds ([4 x i8], [4 x i8]* @str, i64 0, i64 0), i32 %0)
  ret i32 %0
}
"#;
