/// Modeling guidelines shared by the MCP server instructions and the `get_guidelines` tool.
pub const GUIDELINES: &str = "\
1. One document per concern. A use-case model, a domain model, an ER model and an architecture \
model are separate documents. Do not mix tables into a domain model or actors into an architecture.\n\
2. Ids are stable handles, names are for people. Every relationship, connection and layer refers \
to ids. Renaming an entity changes its `name`, never its `id`.\n\
3. References must resolve. A relationship whose source or target id is not present in the same \
document is left out of the diagram and reported as a warning by `render_diagram`. Fix the id \
instead of ignoring the warning.\n\
4. Actors are outside the system. Use `primary` for people who start use cases, `secondary` for \
people who support them, and `system` for external software. The system under design is never an actor.\n\
5. Include vs extend. `include` points from the base use case to a step it always performs; \
`extend` points from the optional behaviour to the use case it extends.\n\
6. Aggregates own their boundary. Every aggregate lists its root among its `entities`. Other \
aggregates refer to it by the root's id only.\n\
7. Value objects have no identity. Model money, addresses and ranges as value objects with \
invariants, not as entities with an `id` attribute.\n\
8. Pick the weakest relationship that is true. `composition` means the part dies with the whole, \
`aggregation` means shared ownership, `association` means a reference, `dependency` means \
a transient use, `inheritance` means substitutability.\n\
9. Tables carry their keys. Every ER entity has exactly one primary-key field. Foreign keys are \
named `<singular>_id` so that relationships can be derived from them.\n\
10. Layers run top to bottom. Give presentation the lowest `order` and data stores the highest. \
Modules not assigned to any layer are drawn below the layers.\n\
11. Name the protocol on every connection (REST, gRPC, SQL, AMQP). Unlabelled connections fall \
back to their kind (`sync`, `async`, `DB`, `cache`).\n\
\n\
## Workflow\n\
1. `list_documents` to see what already exists.\n\
2. Generate a first draft from the requirements text with `generate_use_case`, \
`generate_domain_model`, `generate_er_model` or `generate_architecture`. Pass any actors, \
entities or modules you already know; they are kept verbatim and only the missing parts are drafted.\n\
3. Read the draft with `get_document`, correct the structured content, and check it with \
`render_diagram`. Resolve every warning, then store the result with `save_document`.\n\
4. Use `export_document` to hand the Mermaid text or Markdown to the user.";
