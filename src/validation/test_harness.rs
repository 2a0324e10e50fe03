//! Fixture schema and assertion helpers shared by the validator rule tests.

use std::mem;

use crate::{
    ast::{Document, InputValue},
    parser::parse_document_source,
    schema::{
        meta::{
            Argument, DirectiveLocation, DirectiveType, EnumType, EnumValue, Field,
            InputObjectType, InterfaceType, ObjectType, TypeRef, UnionType,
        },
        model::Schema,
    },
    validation::{visit, MultiVisitorNil, RuleError, ValidatorContext, Visitor},
};

fn named_field(name: &str) -> Field {
    Field::new(name, TypeRef::string())
        .argument(Argument::new("surname", TypeRef::boolean()))
}

fn test_schema() -> std::sync::Arc<Schema> {
    let being = InterfaceType::new("Being", vec![named_field("name")]);
    let pet = InterfaceType::new("Pet", vec![named_field("name")]);
    let canine = InterfaceType::new("Canine", vec![named_field("name")]);
    let intelligent = InterfaceType::new("Intelligent", vec![Field::new("iq", TypeRef::int())]);

    let dog_command = EnumType::new(
        "DogCommand",
        vec![
            EnumValue::new("SIT"),
            EnumValue::new("HEEL"),
            EnumValue::new("DOWN"),
        ],
    );
    let fur_color = EnumType::new(
        "FurColor",
        vec![
            EnumValue::new("BROWN"),
            EnumValue::new("BLACK"),
            EnumValue::new("TAN"),
            EnumValue::new("SPOTTED"),
        ],
    );

    let dog = ObjectType::new(
        "Dog",
        vec![
            named_field("name"),
            Field::new("nickname", TypeRef::string()),
            Field::new("barkVolume", TypeRef::int()),
            Field::new("barks", TypeRef::boolean()),
            Field::new("doesKnowCommand", TypeRef::boolean())
                .argument(Argument::new("dogCommand", TypeRef::named("DogCommand"))),
            Field::new("isHousetrained", TypeRef::boolean()).argument(
                Argument::new("atOtherHomes", TypeRef::boolean())
                    .default_value(InputValue::Boolean(true)),
            ),
            Field::new("isAtLocation", TypeRef::boolean())
                .argument(Argument::new("x", TypeRef::int()))
                .argument(Argument::new("y", TypeRef::int())),
        ],
    )
    .interfaces(["Being", "Pet", "Canine"]);

    let cat = ObjectType::new(
        "Cat",
        vec![
            named_field("name"),
            Field::new("nickname", TypeRef::string()),
            Field::new("meows", TypeRef::boolean()),
            Field::new("meowVolume", TypeRef::int()),
            Field::new("furColor", TypeRef::named("FurColor")),
        ],
    )
    .interfaces(["Being", "Pet"]);

    let human = ObjectType::new(
        "Human",
        vec![
            named_field("name"),
            Field::new("pets", TypeRef::named("Pet").list()),
            Field::new("relatives", TypeRef::named("Human").list()),
            Field::new("iq", TypeRef::int()),
        ],
    )
    .interfaces(["Being", "Intelligent"]);

    let alien = ObjectType::new(
        "Alien",
        vec![
            named_field("name"),
            Field::new("iq", TypeRef::int()),
            Field::new("numEyes", TypeRef::int()),
        ],
    )
    .interfaces(["Being", "Intelligent"]);

    // The rule tests never execute, so the unions resolve to nothing.
    let cat_or_dog = UnionType::new("CatOrDog", ["Cat", "Dog"]).resolve_type(|_, _| None);
    let dog_or_human = UnionType::new("DogOrHuman", ["Dog", "Human"]).resolve_type(|_, _| None);
    let human_or_alien =
        UnionType::new("HumanOrAlien", ["Human", "Alien"]).resolve_type(|_, _| None);

    let complex_input = InputObjectType::new(
        "ComplexInput",
        vec![
            Argument::new("requiredField", TypeRef::boolean().non_null()),
            Argument::new("intField", TypeRef::int()),
            Argument::new("stringField", TypeRef::string()),
            Argument::new("booleanField", TypeRef::boolean()),
            Argument::new("stringListField", TypeRef::string().list()),
        ],
    );

    let complicated_args = ObjectType::new(
        "ComplicatedArgs",
        vec![
            Field::new("intArgField", TypeRef::string())
                .argument(Argument::new("intArg", TypeRef::int())),
            Field::new("nonNullIntArgField", TypeRef::string())
                .argument(Argument::new("nonNullIntArg", TypeRef::int().non_null())),
            Field::new("stringArgField", TypeRef::string())
                .argument(Argument::new("stringArg", TypeRef::string())),
            Field::new("booleanArgField", TypeRef::string())
                .argument(Argument::new("booleanArg", TypeRef::boolean())),
            Field::new("enumArgField", TypeRef::string())
                .argument(Argument::new("enumArg", TypeRef::named("FurColor"))),
            Field::new("floatArgField", TypeRef::string())
                .argument(Argument::new("floatArg", TypeRef::float())),
            Field::new("idArgField", TypeRef::string())
                .argument(Argument::new("idArg", TypeRef::id())),
            Field::new("stringListArgField", TypeRef::string())
                .argument(Argument::new("stringListArg", TypeRef::string().list())),
            Field::new("nonNullStringListArgField", TypeRef::string()).argument(Argument::new(
                "nonNullStringListArg",
                TypeRef::string().non_null().list().non_null(),
            )),
            Field::new("complexArgField", TypeRef::string())
                .argument(Argument::new("complexArg", TypeRef::named("ComplexInput"))),
            Field::new("multipleReqs", TypeRef::string())
                .argument(Argument::new("req1", TypeRef::int().non_null()))
                .argument(Argument::new("req2", TypeRef::int().non_null())),
            Field::new("multipleOpts", TypeRef::string())
                .argument(Argument::new("opt1", TypeRef::int()).default_value(InputValue::Int(0)))
                .argument(Argument::new("opt2", TypeRef::int()).default_value(InputValue::Int(0))),
            Field::new("multipleOptAndReq", TypeRef::string())
                .argument(Argument::new("req1", TypeRef::int().non_null()))
                .argument(Argument::new("req2", TypeRef::int().non_null()))
                .argument(Argument::new("opt1", TypeRef::int()).default_value(InputValue::Int(0)))
                .argument(Argument::new("opt2", TypeRef::int()).default_value(InputValue::Int(0))),
        ],
    );

    let query_root = ObjectType::new(
        "QueryRoot",
        vec![
            Field::new("human", TypeRef::named("Human"))
                .argument(Argument::new("id", TypeRef::id())),
            Field::new("alien", TypeRef::named("Alien")),
            Field::new("dog", TypeRef::named("Dog")),
            Field::new("cat", TypeRef::named("Cat")),
            Field::new("pet", TypeRef::named("Pet")),
            Field::new("being", TypeRef::named("Being")),
            Field::new("catOrDog", TypeRef::named("CatOrDog")),
            Field::new("dogOrHuman", TypeRef::named("DogOrHuman")),
            Field::new("humanOrAlien", TypeRef::named("HumanOrAlien")),
            Field::new("complicatedArgs", TypeRef::named("ComplicatedArgs")),
        ],
    );

    let mutation_root = ObjectType::new(
        "MutationRoot",
        vec![Field::new("testInput", TypeRef::string())
            .argument(Argument::new("input", TypeRef::named("ComplexInput")))],
    );

    let subscription_root = ObjectType::new(
        "SubscriptionRoot",
        vec![
            Field::new("newMessage", TypeRef::string()),
            Field::new("disturbance", TypeRef::boolean()),
        ],
    );

    let mut builder = Schema::builder(query_root)
        .mutation(mutation_root)
        .subscription(subscription_root)
        .register(being)
        .register(pet)
        .register(canine)
        .register(intelligent)
        .register(dog_command)
        .register(fur_color)
        .register(dog)
        .register(cat)
        .register(human)
        .register(alien)
        .register(cat_or_dog)
        .register(dog_or_human)
        .register(human_or_alien)
        .register(complex_input)
        .register(complicated_args);

    for (name, location) in [
        ("onQuery", DirectiveLocation::Query),
        ("onMutation", DirectiveLocation::Mutation),
        ("onSubscription", DirectiveLocation::Subscription),
        ("onField", DirectiveLocation::Field),
        ("onFragmentDefinition", DirectiveLocation::FragmentDefinition),
        ("onFragmentSpread", DirectiveLocation::FragmentSpread),
        ("onInlineFragment", DirectiveLocation::InlineFragment),
    ] {
        builder = builder.directive(DirectiveType::new(name, [location]));
    }

    builder.finish().expect("test schema must build")
}

fn validate_rule<'a, V, F>(
    factory: F,
    q: &'a str,
    introspection_enabled: bool,
) -> Vec<RuleError>
where
    V: Visitor<'a> + 'a,
    F: FnOnce() -> V,
{
    let schema = test_schema();
    let doc =
        parse_document_source(q).unwrap_or_else(|e| panic!("Parse error on input {q:#?}: {e:?}"));

    // The visitor only borrows the document and schema for the duration of
    // the traversal; the transmutes paper over the fact that both are locals
    // while `'a` is a caller lifetime.
    let mut ctx = ValidatorContext::new(
        unsafe { mem::transmute::<&Schema, &'a Schema>(&schema) },
        &doc,
        introspection_enabled,
    );

    let mut mv = MultiVisitorNil.with(factory());
    visit(&mut mv, &mut ctx, unsafe {
        mem::transmute::<&Document<'_>, &'a Document<'a>>(doc.as_slice())
    });

    ctx.into_errors()
}

pub(crate) fn expect_passes_rule<'a, V, F>(factory: F, q: &'a str)
where
    V: Visitor<'a> + 'a,
    F: FnOnce() -> V,
{
    let errs = validate_rule(factory, q, true);

    if !errs.is_empty() {
        print_errors(&errs);
        panic!("Expected rule to pass, but errors found");
    }
}

/// Asserts that the rule rejects the query with exactly the given error
/// messages, in sorted order. Positions are not compared.
pub(crate) fn expect_fails_rule<'a, V, F>(factory: F, q: &'a str, expected_messages: &[&str])
where
    V: Visitor<'a> + 'a,
    F: FnOnce() -> V,
{
    let errs = validate_rule(factory, q, true);

    if errs.is_empty() {
        panic!("Expected rule to fail, but no errors were found");
    }

    let messages = errs.iter().map(RuleError::message).collect::<Vec<_>>();
    if messages != expected_messages {
        println!("==> Expected errors:");
        for m in expected_messages {
            println!("    {m}");
        }
        println!("\n==> Actual errors:");
        print_errors(&errs);
        panic!("Unexpected set of errors found");
    }
}

pub(crate) fn expect_passes_rule_without_introspection<'a, V, F>(factory: F, q: &'a str)
where
    V: Visitor<'a> + 'a,
    F: FnOnce() -> V,
{
    let errs = validate_rule(factory, q, false);

    if !errs.is_empty() {
        print_errors(&errs);
        panic!("Expected rule to pass, but errors found");
    }
}

pub(crate) fn expect_fails_rule_without_introspection<'a, V, F>(
    factory: F,
    q: &'a str,
    expected_messages: &[&str],
) where
    V: Visitor<'a> + 'a,
    F: FnOnce() -> V,
{
    let errs = validate_rule(factory, q, false);

    if errs.is_empty() {
        panic!("Expected rule to fail, but no errors were found");
    }

    let messages = errs.iter().map(RuleError::message).collect::<Vec<_>>();
    if messages != expected_messages {
        println!("==> Expected errors:");
        for m in expected_messages {
            println!("    {m}");
        }
        println!("\n==> Actual errors:");
        print_errors(&errs);
        panic!("Unexpected set of errors found");
    }
}

fn print_errors(errs: &[RuleError]) {
    for err in errs {
        for p in err.locations() {
            print!("[{:>3},{:>3},{:>3}]  ", p.index(), p.line(), p.column());
        }
        println!("{}", err.message());
    }
}
