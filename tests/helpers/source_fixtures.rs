//! Common source code fixtures for tests.

/// The interface the default configuration looks for.
pub const SPECIFIC_INTERFACE: &str = r#"namespace SpecificNamespace
{
    public interface ISpecificInterface
    {
        void Process();
    }
}
"#;

/// A single-file project violating the convention once.
pub const ORIGINAL_BEFORE: &str = "namespace SpecificNamespace;

public class Class1
{
    public void Run()
    {
        // should call Process of SpecificNamespace.ISpecificInterface
    }

}


public interface ISpecificInterface
{
    void Process();
}";

/// `ORIGINAL_BEFORE` after its fix is applied.
pub const ORIGINAL_AFTER: &str = "namespace SpecificNamespace;

public class Class1
{
    public void Run(SpecificNamespace.ISpecificInterface specificInterface)
    {
        specificInterface.Process();
        // should call Process of SpecificNamespace.ISpecificInterface
    }

}


public interface ISpecificInterface
{
    void Process();
}";

/// Wrap class members in a class inside `SpecificNamespace`.
pub fn worker_with(members: &str) -> String {
    format!(
        "namespace SpecificNamespace\n{{\n    public class Worker\n    {{\n{members}\n    }}\n}}\n"
    )
}
