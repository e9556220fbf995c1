use std::str::FromStr;

use roxmltree::{Document, Node};

use crate::error::DecodeError;
use crate::gid::Gid;
use crate::loader::encoding::{decode_grid, decode_points};
use crate::model::*;

fn tag(node: Node) -> String {
    node.tag_name().name().to_owned()
}

fn required<'a>(node: Node<'a, '_>, name: &'static str) -> Result<&'a str, DecodeError> {
    node.attribute(name)
        .ok_or_else(|| DecodeError::MissingAttribute {
            tag: tag(node),
            attribute: name,
        })
}

fn parse_value<T: FromStr>(node: Node, name: &'static str, value: &str) -> Result<T, DecodeError> {
    value.trim().parse().map_err(|_| DecodeError::InvalidAttribute {
        tag: tag(node),
        attribute: name,
        value: value.to_owned(),
    })
}

fn attribute<T: FromStr>(node: Node, name: &'static str) -> Result<T, DecodeError> {
    parse_value(node, name, required(node, name)?)
}

fn attribute_opt<T: FromStr>(node: Node, name: &'static str) -> Result<Option<T>, DecodeError> {
    node.attribute(name)
        .map(|v| parse_value(node, name, v))
        .transpose()
}

fn attribute_or<T: FromStr>(node: Node, name: &'static str, default: T) -> Result<T, DecodeError> {
    Ok(attribute_opt(node, name)?.unwrap_or(default))
}

fn text_attr(node: Node, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_owned()
}

// Tiled writes 0/1, hand-written documents sometimes use true/false.
fn flag(node: Node, name: &'static str, default: bool) -> Result<bool, DecodeError> {
    match node.attribute(name) {
        None => Ok(default),
        Some("1") | Some("true") => Ok(true),
        Some("0") | Some("false") => Ok(false),
        Some(other) => Err(DecodeError::InvalidAttribute {
            tag: tag(node),
            attribute: name,
            value: other.to_owned(),
        }),
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(name))
}

fn required_child<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> Result<Node<'a, 'input>, DecodeError> {
    child(node, name).ok_or_else(|| DecodeError::MissingElement {
        tag: tag(node),
        child: name,
    })
}

fn root_element<'a, 'input>(
    doc: &'a Document<'input>,
    expected: &'static str,
) -> Result<Node<'a, 'input>, DecodeError> {
    let root = doc.root_element();
    if !root.has_tag_name(expected) {
        return Err(DecodeError::UnexpectedRoot {
            expected,
            found: tag(root),
        });
    }
    Ok(root)
}

fn properties(node: Node) -> Result<Properties, DecodeError> {
    let Some(list) = child(node, "properties") else {
        return Ok(Properties::new());
    };
    list.children()
        .filter(|c| c.has_tag_name("property"))
        .map(|p| -> Result<Property, DecodeError> {
            Ok(Property {
                name: required(p, "name")?.to_owned(),
                kind: p.attribute("type").unwrap_or("string").to_owned(),
                // multi-line strings are stored as element text
                value: match p.attribute("value") {
                    Some(v) => v.to_owned(),
                    None => p.text().unwrap_or_default().to_owned(),
                },
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Properties)
}

/// Decode a `.tmx` map document.
pub fn decode_map(bytes: &[u8]) -> Result<MapDocument, DecodeError> {
    let text = std::str::from_utf8(bytes)?;
    let doc = Document::parse(text)?;
    let root = root_element(&doc, "map")?;

    let tilesets = root
        .children()
        .filter(|c| c.has_tag_name("tileset"))
        .map(tileset_ref)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MapDocument {
        version: text_attr(root, "version"),
        tiled_version: text_attr(root, "tiledversion"),
        orientation: root.attribute("orientation").unwrap_or("orthogonal").to_owned(),
        render_order: root.attribute("renderorder").unwrap_or("right-down").to_owned(),
        width: attribute(root, "width")?,
        height: attribute(root, "height")?,
        tile_width: attribute(root, "tilewidth")?,
        tile_height: attribute(root, "tileheight")?,
        infinite: flag(root, "infinite", false)?,
        tilesets,
        layers: layer_nodes(root)?,
        properties: properties(root)?,
    })
}

/// Decode a standalone `.tsx` tileset document.
pub fn decode_tileset(bytes: &[u8]) -> Result<TileSet, DecodeError> {
    let text = std::str::from_utf8(bytes)?;
    let doc = Document::parse(text)?;
    tileset(root_element(&doc, "tileset")?)
}

fn tileset_ref(node: Node) -> Result<TileSetRef, DecodeError> {
    let source = match node.attribute("source") {
        Some(path) => TileSetSource::External(path.to_owned()),
        None => TileSetSource::Embedded(Box::new(tileset(node)?)),
    };
    Ok(TileSetRef {
        first_gid: attribute(node, "firstgid")?,
        source,
    })
}

fn tileset(node: Node) -> Result<TileSet, DecodeError> {
    let image = required_child(node, "image")?;
    let tiles = node
        .children()
        .filter(|c| c.has_tag_name("tile"))
        .map(tile)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TileSet {
        name: text_attr(node, "name"),
        path: Default::default(),
        tile_width: attribute(node, "tilewidth")?,
        tile_height: attribute(node, "tileheight")?,
        tile_count: attribute_or(node, "tilecount", 0)?,
        columns: attribute(node, "columns")?,
        spacing: attribute_or(node, "spacing", 0)?,
        margin: attribute_or(node, "margin", 0)?,
        image: ImageDefinition {
            source: required(image, "source")?.to_owned(),
            width: attribute_or(image, "width", 0)?,
            height: attribute_or(image, "height", 0)?,
        },
        properties: properties(node)?,
        tiles,
    })
}

fn tile(node: Node) -> Result<Tile, DecodeError> {
    let animation = match child(node, "animation") {
        Some(anim) => anim
            .children()
            .filter(|c| c.has_tag_name("frame"))
            .map(|f| -> Result<Frame, DecodeError> {
                Ok(Frame {
                    tile_id: attribute(f, "tileid")?,
                    duration_ms: attribute(f, "duration")?,
                })
            })
            .collect::<Result<Vec<_>, DecodeError>>()?,
        None => Vec::new(),
    };

    let collision = child(node, "objectgroup")
        .map(|group| -> Result<TileObjectGroup, DecodeError> {
            Ok(TileObjectGroup {
                id: attribute_or(group, "id", 0)?,
                draw_order: group.attribute("draworder").map(str::to_owned),
                properties: properties(group)?,
                objects: group
                    .children()
                    .filter(|c| c.has_tag_name("object"))
                    .map(tileset_object)
                    .collect::<Result<Vec<_>, _>>()?,
            })
        })
        .transpose()?;

    Ok(Tile {
        id: attribute(node, "id")?,
        properties: properties(node)?,
        animation,
        collision,
    })
}

/// At most one of `<point>`, `<ellipse>`, `<polygon>` may be present; none means rectangle.
fn object_shape(node: Node, id: u32) -> Result<ObjectShape, DecodeError> {
    let mut shape = None;
    for marker in node.children().filter(|c| c.is_element()) {
        let next = match marker.tag_name().name() {
            "point" => ObjectShape::Point,
            "ellipse" => ObjectShape::Ellipse,
            "polygon" => ObjectShape::Polygon(Polygon {
                points: decode_points(required(marker, "points")?)?,
            }),
            _ => continue,
        };
        if shape.replace(next).is_some() {
            return Err(DecodeError::AmbiguousShape { object: id });
        }
    }
    Ok(shape.unwrap_or(ObjectShape::Rectangle))
}

// Tiled 1.9 renamed `type` to `class`.
fn object_kind(node: Node) -> String {
    node.attribute("type")
        .or_else(|| node.attribute("class"))
        .unwrap_or_default()
        .to_owned()
}

fn tileset_object(node: Node) -> Result<TileSetObject, DecodeError> {
    let id = attribute_or(node, "id", 0)?;
    Ok(TileSetObject {
        id,
        name: text_attr(node, "name"),
        kind: object_kind(node),
        x: attribute_or(node, "x", 0.0)?,
        y: attribute_or(node, "y", 0.0)?,
        width: attribute_opt(node, "width")?,
        height: attribute_opt(node, "height")?,
        visible: flag(node, "visible", true)?,
        shape: object_shape(node, id)?,
        properties: properties(node)?,
    })
}

fn map_object(node: Node) -> Result<MapObject, DecodeError> {
    let id = attribute_or(node, "id", 0)?;
    Ok(MapObject {
        id,
        gid: Gid(attribute_or(node, "gid", 0)?),
        name: text_attr(node, "name"),
        kind: object_kind(node),
        x: attribute_or(node, "x", 0.0)?,
        y: attribute_or(node, "y", 0.0)?,
        width: attribute_opt(node, "width")?,
        height: attribute_opt(node, "height")?,
        visible: flag(node, "visible", true)?,
        shape: object_shape(node, id)?,
        properties: properties(node)?,
    })
}

/// Layer-like children of `parent`, in document order.
fn layer_nodes(parent: Node) -> Result<Vec<LayerNode>, DecodeError> {
    let mut nodes = Vec::new();
    for node in parent.children() {
        match node.tag_name().name() {
            "layer" => nodes.push(LayerNode::Tiles(tile_layer(node)?)),
            "objectgroup" => nodes.push(LayerNode::Objects(object_group(node)?)),
            "group" => nodes.push(LayerNode::Group(group_layer(node)?)),
            _ => {}
        }
    }
    Ok(nodes)
}

fn tile_layer(node: Node) -> Result<Layer, DecodeError> {
    let data = required_child(node, "data")?;
    match data.attribute("encoding") {
        None | Some("csv") => {}
        Some(other) => return Err(DecodeError::UnsupportedEncoding(other.to_owned())),
    }
    if let Some(compression) = data.attribute("compression") {
        return Err(DecodeError::UnsupportedEncoding(format!("csv+{compression}")));
    }
    let rows: Vec<Vec<Gid>> = decode_grid(data.text().unwrap_or_default())?
        .into_iter()
        .map(|row| row.into_iter().map(Gid).collect())
        .collect();

    Ok(Layer {
        id: attribute_or(node, "id", 0)?,
        name: text_attr(node, "name"),
        width: attribute(node, "width")?,
        height: attribute(node, "height")?,
        visible: flag(node, "visible", true)?,
        properties: properties(node)?,
        rows,
    })
}

fn object_group(node: Node) -> Result<ObjectGroup, DecodeError> {
    Ok(ObjectGroup {
        id: attribute_or(node, "id", 0)?,
        name: text_attr(node, "name"),
        visible: flag(node, "visible", true)?,
        properties: properties(node)?,
        objects: node
            .children()
            .filter(|c| c.has_tag_name("object"))
            .map(map_object)
            .collect::<Result<Vec<_>, _>>()?,
    })
}

fn group_layer(node: Node) -> Result<GroupLayer, DecodeError> {
    Ok(GroupLayer {
        id: attribute_or(node, "id", 0)?,
        name: text_attr(node, "name"),
        visible: flag(node, "visible", true)?,
        properties: properties(node)?,
        children: layer_nodes(node)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED_MAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" tiledversion="1.10.2" orientation="orthogonal" renderorder="right-down"
     width="2" height="2" tilewidth="16" tileheight="16" infinite="0">
 <properties>
  <property name="music" value="forest.ogg"/>
  <property name="intro" type="string">line one
line two</property>
 </properties>
 <tileset firstgid="1" source="terrain.tsx"/>
 <tileset firstgid="65" source="../shared/props.tsx"/>
 <layer id="1" name="ground" width="2" height="2">
  <data encoding="csv">
1,2,
3,0
</data>
 </layer>
 <group id="2" name="decor" visible="0">
  <objectgroup id="3" name="hazards">
   <object id="1" gid="66" x="32" y="48" width="16" height="16"/>
   <object id="2" name="spawn" class="marker" x="4" y="4"><point/></object>
  </objectgroup>
  <layer id="4" name="overlay" width="2" height="2">
   <data encoding="csv">0,0,
0,2147483653</data>
  </layer>
  <group id="5" name="inner"/>
 </group>
 <objectgroup id="6" name="hazards"/>
</map>"#;

    #[test]
    fn decodes_map_tree_in_document_order() {
        let map = decode_map(NESTED_MAP.as_bytes()).expect("decode");
        assert_eq!((map.width, map.height, map.tile_width, map.tile_height), (2, 2, 16, 16));
        assert!(!map.infinite);
        assert_eq!(map.tilesets.len(), 2);
        assert_eq!(map.tilesets[1].first_gid, 65);
        assert_eq!(
            map.tilesets[1].source,
            TileSetSource::External("../shared/props.tsx".into())
        );
        assert_eq!(map.properties.get_str("music"), Some("forest.ogg"));
        assert_eq!(map.properties.get_str("intro"), Some("line one\nline two"));

        let names: Vec<&str> = map.layers.iter().map(LayerNode::name).collect();
        assert_eq!(names, ["ground", "decor", "hazards"]);

        let LayerNode::Tiles(ground) = &map.layers[0] else { panic!("expected tile layer") };
        assert_eq!(ground.rows, vec![vec![Gid(1), Gid(2)], vec![Gid(3), Gid(0)]]);

        let LayerNode::Group(decor) = &map.layers[1] else { panic!("expected group") };
        assert!(!decor.visible);
        let child_names: Vec<&str> = decor.children.iter().map(LayerNode::name).collect();
        assert_eq!(child_names, ["hazards", "overlay", "inner"]);
        assert_eq!(decor.layers().count(), 1);
        assert_eq!(decor.groups().count(), 1);

        let hazards = decor.object_groups().next().expect("object group");
        assert_eq!(hazards.objects[0].gid, Gid(66));
        assert_eq!(hazards.objects[0].shape, ObjectShape::Rectangle);
        assert_eq!(hazards.objects[1].gid, Gid::EMPTY);
        assert_eq!(hazards.objects[1].kind, "marker");
        assert_eq!(hazards.objects[1].shape, ObjectShape::Point);

        let overlay = decor.layers().next().expect("overlay");
        let flipped = overlay.gid_at(1, 1).expect("cell");
        assert!(flipped.flip_h());
        assert_eq!(flipped.clean(), 5);
    }

    const TILESET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.10" name="terrain" tilewidth="16" tileheight="16" tilecount="64" columns="8" spacing="1" margin="2">
 <image source="terrain.png" width="146" height="146"/>
 <tile id="3">
  <animation>
   <frame tileid="3" duration="100"/>
   <frame tileid="4" duration="200"/>
  </animation>
 </tile>
 <tile id="9" type="wall">
  <objectgroup draworder="index" id="2">
   <object id="1" x="0" y="8" width="16" height="8"/>
   <object id="2" name="pivot" x="8" y="8"><point/></object>
   <object id="3" x="2" y="2" width="4" height="4"><ellipse/></object>
   <object id="4" x="0" y="0"><polygon points="0,0 16,0 8,-4.5"/></object>
  </objectgroup>
 </tile>
</tileset>"#;

    #[test]
    fn decodes_tileset_with_animation_and_collision() {
        let ts = decode_tileset(TILESET.as_bytes()).expect("decode");
        assert_eq!(ts.name, "terrain");
        assert_eq!((ts.columns, ts.tile_count, ts.spacing, ts.margin), (8, 64, 1, 2));
        assert_eq!(ts.image.source, "terrain.png");

        let animated = ts.tile(3).expect("tile 3");
        assert_eq!(
            animated.animation,
            vec![
                Frame { tile_id: 3, duration_ms: 100 },
                Frame { tile_id: 4, duration_ms: 200 }
            ]
        );
        assert!(animated.collision.is_none());
        assert!(ts.tile(4).is_none());

        let wall = ts.tile(9).expect("tile 9");
        assert!(!wall.is_animated());
        let group = wall.collision.as_ref().expect("collision group");
        assert_eq!(group.draw_order.as_deref(), Some("index"));
        let shapes: Vec<&ObjectShape> = group.objects.iter().map(|o| &o.shape).collect();
        assert_eq!(shapes[0], &ObjectShape::Rectangle);
        assert_eq!(group.objects[0].height, Some(8.0));
        assert_eq!(shapes[1], &ObjectShape::Point);
        assert_eq!(group.objects[1].width, None);
        assert_eq!(shapes[2], &ObjectShape::Ellipse);
        assert_eq!(
            shapes[3],
            &ObjectShape::Polygon(Polygon {
                points: vec![
                    Point { x: 0.0, y: 0.0 },
                    Point { x: 16.0, y: 0.0 },
                    Point { x: 8.0, y: -4.5 },
                ]
            })
        );
    }

    #[test]
    fn decodes_embedded_tileset() {
        let map = r#"<map width="1" height="1" tilewidth="8" tileheight="8">
 <tileset firstgid="1" name="inline" tilewidth="8" tileheight="8" tilecount="4" columns="2">
  <image source="inline.png" width="16" height="16"/>
 </tileset>
 <layer name="l" width="1" height="1"><data encoding="csv">1</data></layer>
</map>"#;
        let map = decode_map(map.as_bytes()).expect("decode");
        let TileSetSource::Embedded(ts) = &map.tilesets[0].source else {
            panic!("expected embedded tileset")
        };
        assert_eq!(ts.name, "inline");
        assert_eq!(map.orientation, "orthogonal");
        assert_eq!(map.render_order, "right-down");
    }

    #[test]
    fn rejects_object_with_two_shapes() {
        let ts = r#"<tileset tilewidth="8" tileheight="8" columns="1">
 <image source="a.png"/>
 <tile id="0"><objectgroup><object id="7"><point/><ellipse/></object></objectgroup></tile>
</tileset>"#;
        let err = decode_tileset(ts.as_bytes()).expect_err("two shapes");
        assert!(matches!(err, DecodeError::AmbiguousShape { object: 7 }));
    }

    #[test]
    fn reports_missing_and_invalid_attributes() {
        let err = decode_map(br#"<map width="1" height="1" tilewidth="8"/>"#).expect_err("no tileheight");
        assert!(matches!(
            err,
            DecodeError::MissingAttribute { ref tag, attribute: "tileheight" } if tag == "map"
        ));

        let err = decode_map(br#"<map width="x" height="1" tilewidth="8" tileheight="8"/>"#)
            .expect_err("bad width");
        assert!(matches!(err, DecodeError::InvalidAttribute { attribute: "width", .. }));

        let err = decode_tileset(br#"<tileset tilewidth="8" tileheight="8" columns="1"/>"#)
            .expect_err("no image");
        assert!(matches!(err, DecodeError::MissingElement { child: "image", .. }));
    }

    #[test]
    fn rejects_wrong_root_and_bad_xml() {
        let err = decode_tileset(br#"<map width="1" height="1" tilewidth="8" tileheight="8"/>"#)
            .expect_err("map is not a tileset");
        assert!(matches!(err, DecodeError::UnexpectedRoot { expected: "tileset", .. }));
        assert!(matches!(decode_map(b"<map"), Err(DecodeError::Xml(_))));
        assert!(matches!(decode_map(&[0xff, 0xfe]), Err(DecodeError::Utf8(_))));
    }

    #[test]
    fn rejects_unsupported_data_and_bad_cells() {
        let base64 = r#"<map width="1" height="1" tilewidth="8" tileheight="8">
 <layer name="l" width="1" height="1"><data encoding="base64">AQAAAA==</data></layer>
</map>"#;
        assert!(matches!(
            decode_map(base64.as_bytes()),
            Err(DecodeError::UnsupportedEncoding(e)) if e == "base64"
        ));

        let bad_cell = r#"<map width="2" height="1" tilewidth="8" tileheight="8">
 <layer name="l" width="2" height="1"><data encoding="csv">1,?</data></layer>
</map>"#;
        assert!(matches!(
            decode_map(bad_cell.as_bytes()),
            Err(DecodeError::InvalidGridToken { row: 0, .. })
        ));
    }
}
